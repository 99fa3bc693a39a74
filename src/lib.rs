//! # Portrait Studio
//!
//! Server and tooling for a small photo studio site: upload a portrait, get it checked
//! by a hosted vision model, optionally cleaned up by an image-edit model, and turned
//! into a poster. Posters and scores can be pinned to a shared leaderboard.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `config`: server settings and per-call credential lookup
//! - `error`: the [`StudioError`] taxonomy and its HTTP mapping
//! - `proxy`: relays to the xAI and Gemini APIs
//! - `leaderboard`: capped, sorted, persisted hall of fame
//! - `dashboard`: read-only views over funding records
//! - `session`: upload generations for one user's photo
//! - `server`: the axum router and server loop
//!
//! Image work (cropping, grayscale, fades, text, landmark overlay, amounts) lives in
//! the `studio-compose` crate.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use portrait_studio::{config::{EnvCredentials, ServerConfig}, server::start_server};
//!
//! # async fn example() -> anyhow::Result<()> {
//! start_server(ServerConfig::default(), Arc::new(EnvCredentials)).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dashboard;
pub mod error;
pub mod leaderboard;
pub mod proxy;
pub mod server;
pub mod session;

pub use config::{Credentials, EnvCredentials, ServerConfig, StaticCredentials};
pub use error::{StudioError, StudioResult};
pub use leaderboard::{HALL_CAPACITY, Leaderboard, LeaderboardEntry, NewEntry};
pub use session::{Generation, PhotoSession};
