//! # Configuration Module
//!
//! Server settings and credential lookup.
//!
//! ## Overview
//!
//! [`ServerConfig`] holds everything that is fixed for the lifetime of the server. It is
//! filled from CLI flags or environment variables by the `studio` binary and validated
//! before the listener binds.
//!
//! API keys are deliberately *not* part of [`ServerConfig`]. They are looked up through
//! [`Credentials`] on every request, so a missing key only breaks the endpoint that
//! needs it and is reported when that endpoint is called.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Env | Default | Description |
//! |-----------|-----|---------|-------------|
//! | `port` | `PORT` | 3000 | Listen port |
//! | `doc_root` | `DOC_ROOT` | `public` | Static file root |
//! | `hall_path` | `HALL_PATH` | `hall.json` | Leaderboard storage file |
//! | `hall_key` | `HALL_KEY` | `hall_of_fame` | Key the leaderboard is stored under |
//! | `analyze_prompt` | `ANALYZE_PROMPT` | neutral face check | Instruction sent with `/api/analyze` |
//! | `xai_model` | `XAI_MODEL` | `grok-2-vision-latest` | Analysis model |
//! | `gemini_model` | `GEMINI_MODEL` | `gemini-2.0-flash-preview-image-generation` | Edit model |
//!
//! ## Secrets
//!
//! | Variable | Used by |
//! |----------|---------|
//! | `XAI_API_KEY` | `POST /api/analyze`, `GET /api/health` |
//! | `GEMINI_API_KEY` | `POST /api/gemini-edit` |

use std::{env, path::PathBuf};

pub const XAI_API_KEY: &str = "XAI_API_KEY";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// Instruction sent with every `/api/analyze` request unless overridden.
pub const DEFAULT_ANALYZE_PROMPT: &str = r#"You are a photo checking assistant. Look at this image and respond ONLY with a JSON object (no markdown, no code blocks, just raw JSON).

If there is NO clear human face in the image, respond with:
{"error": "no_face", "message": "Please upload a clear photo of a person's face"}

If there IS a face, respond with:
{
    "face_detected": true,
    "confidence": <number 0-100, how clearly the face is visible>,
    "analysis": "<one neutral sentence about lighting, framing and expression>"
}

Do not guess ethnicity, religion, nationality or any other protected attribute."#;

/// Instruction sent with every `/api/gemini-edit` request.
pub const EDIT_PROMPT: &str = "Edit this image: Remove the background completely and make the person/subject have a transparent background. Keep only the person, remove everything else. Convert the person to black and white/grayscale. Return only the edited image.";

/// Server configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    /// TCP port to bind on all interfaces.
    pub port: u16,
    /// Directory static files are served from.
    pub doc_root: PathBuf,
    /// JSON file backing the leaderboard.
    pub hall_path: PathBuf,
    /// Key the leaderboard list is stored under inside `hall_path`.
    pub hall_key: String,
    pub analyze_prompt: String,
    pub xai_model: String,
    pub xai_base_url: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            doc_root: PathBuf::from("public"),
            hall_path: PathBuf::from("hall.json"),
            hall_key: "hall_of_fame".to_string(),
            analyze_prompt: DEFAULT_ANALYZE_PROMPT.to_string(),
            xai_model: "grok-2-vision-latest".to_string(),
            xai_base_url: "https://api.x.ai".to_string(),
            gemini_model: "gemini-2.0-flash-preview-image-generation".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

impl ServerConfig {
    /// Validates the configuration parameters.
    ///
    /// # Validation Rules
    ///
    /// - `port` must be greater than 0
    /// - `hall_key`, `analyze_prompt` and both model names must be non-empty
    /// - base URLs must start with `http://` or `https://`
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Port must be greater than 0".to_string());
        }
        if self.hall_key.trim().is_empty() {
            return Err("Leaderboard key must not be empty".to_string());
        }
        if self.analyze_prompt.trim().is_empty() {
            return Err("Analyze prompt must not be empty".to_string());
        }
        if self.xai_model.trim().is_empty() || self.gemini_model.trim().is_empty() {
            return Err("Model names must not be empty".to_string());
        }
        for url in [&self.xai_base_url, &self.gemini_base_url] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("Invalid base URL: {url}"));
            }
        }
        Ok(())
    }
}

/// Source of API secrets, consulted on every call.
pub trait Credentials: Send + Sync {
    fn get(&self, variable: &str) -> Option<String>;

    fn xai_key(&self) -> Option<String> {
        self.get(XAI_API_KEY)
    }

    fn gemini_key(&self) -> Option<String> {
        self.get(GEMINI_API_KEY)
    }
}

/// Reads secrets from the process environment. Empty values count as missing.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvCredentials;

impl Credentials for EnvCredentials {
    fn get(&self, variable: &str) -> Option<String> {
        env::var(variable).ok().filter(|v| !v.trim().is_empty())
    }
}

/// Fixed in-memory secrets, for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct StaticCredentials {
    pub xai: Option<String>,
    pub gemini: Option<String>,
}

impl Credentials for StaticCredentials {
    fn get(&self, variable: &str) -> Option<String> {
        match variable {
            XAI_API_KEY => self.xai.clone(),
            GEMINI_API_KEY => self.gemini.clone(),
            _ => None,
        }
        .filter(|v| !v.trim().is_empty())
    }
}
