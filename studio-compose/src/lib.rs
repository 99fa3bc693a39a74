// SPDX-License-Identifier: MIT
//! # studio-compose: CPU Poster Compositing
//!
//! This crate turns an uploaded photo into a finished poster image: a grayscale portrait
//! that fades into the background, a stacked name, a glowing amount and caption lines.
//!
//! ## Key Components
//!
//! - [`geometry`]: crop planning and canvas presets
//! - [`resample`]: crop + resample built on fast_image_resize
//! - [`filters`]: grayscale and edge fades
//! - [`text`]: ab_glyph rasterization and multi-pass glow
//! - [`landmarks`]: progressive overlay of detected facial landmark points
//! - [`amount`]: weighted random dollar amounts with an injected RNG
//! - [`pipeline`]: the end-to-end poster render
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use studio_compose::pipeline::{compose_poster, decode_image, PosterInputs, PosterLayout};
//!
//! # fn run(bytes: &[u8]) -> Result<(), studio_compose::ComposeError> {
//! let photo = decode_image(bytes)?;
//! let layout = PosterLayout::default();
//! let amount = studio_compose::amount::generate_money(&mut rand::thread_rng());
//!
//! let mut resizer = fast_image_resize::Resizer::new();
//! let poster = compose_poster(
//!     &mut resizer,
//!     &PosterInputs {
//!         photo: &photo,
//!         template: None,
//!         name: "Jane Doe",
//!         amount: &amount,
//!         font: None,
//!         layout: &layout,
//!     },
//! )?;
//! poster.save("poster.png")?;
//! # Ok(())
//! # }
//! ```

pub mod amount;
pub mod blend;
pub mod error;
pub mod filters;
pub mod geometry;
pub mod landmarks;
pub mod pipeline;
pub mod resample;
pub mod text;

pub use error::ComposeError;
