//! # Vision Model Proxy
//!
//! Stateless relays between the upload pages and hosted vision models.
//!
//! ## Flow
//!
//! 1. Validate the request body (an image data URI)
//! 2. Look up the API key through [`Credentials`]; a missing key fails here, before any
//!    network I/O
//! 3. One upstream round trip
//! 4. Relay the result: the JSON object found in the model's text for analysis, the
//!    edited image (or the original with `fallback: true`) for edits

pub mod data_uri;
pub mod extract;
pub mod upstream;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::{Credentials, EDIT_PROMPT, XAI_API_KEY, GEMINI_API_KEY};
use crate::error::{StudioError, StudioResult};
pub use data_uri::DataUri;
pub use extract::extract_json_object;
pub use upstream::{AnalysisUpstream, EditUpstream, GeminiClient, XaiClient};

/// Body of `POST /api/analyze` and `POST /api/gemini-edit`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ImageRequest {
    #[serde(default)]
    pub image: Option<String>,
}

impl ImageRequest {
    fn require_image(&self) -> StudioResult<&str> {
        self.image
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| StudioError::validation("No image provided"))
    }
}

/// Response of `POST /api/gemini-edit`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditResponse {
    pub image: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

/// Response of `GET /api/health`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub api_key_configured: bool,
    pub api_key_length: usize,
    pub timestamp: String,
}

/// Forward an image and `prompt` to the analysis model and relay its JSON answer.
pub async fn analyze(
    request: &ImageRequest,
    credentials: &dyn Credentials,
    upstream: &dyn AnalysisUpstream,
    prompt: &str,
) -> StudioResult<Value> {
    let image = request.require_image()?;
    let api_key = credentials
        .xai_key()
        .ok_or_else(|| StudioError::missing_credential(XAI_API_KEY))?;

    info!(image_len = image.len(), "processing image analysis request");
    let content = upstream.analyze(&api_key, image, prompt).await?;
    extract_json_object(&content)
}

/// Forward an image to the edit model. Returns the original with `fallback` set when
/// the model answered without an image.
pub async fn edit_image(
    request: &ImageRequest,
    credentials: &dyn Credentials,
    upstream: &dyn EditUpstream,
) -> StudioResult<EditResponse> {
    let image = request.require_image()?;
    let parsed = DataUri::parse(image)?;
    let api_key = credentials
        .gemini_key()
        .ok_or_else(|| StudioError::missing_credential(GEMINI_API_KEY))?;

    info!(mime = %parsed.mime_type, "processing image edit request");
    match upstream.edit(&api_key, &parsed, EDIT_PROMPT).await? {
        Some(edited) => Ok(EditResponse {
            image: edited.to_string(),
            fallback: false,
        }),
        None => {
            warn!("no image in edit response, returning original");
            Ok(EditResponse {
                image: image.to_string(),
                fallback: true,
            })
        }
    }
}

/// Diagnostic view of the analysis credential. Never exposes the key itself.
pub fn health(credentials: &dyn Credentials) -> HealthReport {
    let key = credentials.xai_key();
    HealthReport {
        status: "ok".to_string(),
        api_key_configured: key.is_some(),
        api_key_length: key.map_or(0, |k| k.len()),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}
