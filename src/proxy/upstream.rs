//! HTTP clients for the hosted vision models.
//!
//! One round trip per request: no retry, no timeout, no caching.

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::{Value, json};
use tracing::{debug, error, info};

use super::data_uri::DataUri;
use crate::error::{StudioError, StudioResult};

/// A model that answers an image + instruction with free-form text.
#[async_trait]
pub trait AnalysisUpstream: Send + Sync {
    async fn analyze(&self, api_key: &str, image_url: &str, prompt: &str) -> StudioResult<String>;
}

/// A model that answers an image + instruction with an edited image, if any.
#[async_trait]
pub trait EditUpstream: Send + Sync {
    async fn edit(&self, api_key: &str, image: &DataUri, instruction: &str) -> StudioResult<Option<DataUri>>;
}

/// OpenAI-style chat completions endpoint at `api.x.ai`.
#[derive(Clone, Debug)]
pub struct XaiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl XaiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn request_body(&self, image_url: &str, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "image_url", "image_url": { "url": image_url, "detail": "high" } },
                    { "type": "text", "text": prompt }
                ]
            }],
            "temperature": 0.3
        })
    }
}

/// Best-effort message from an error body: `{"error": {"message": ..}}` or `{"error": ".."}`.
pub fn upstream_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::to_string)
}

/// Text content of the first choice in a chat completion.
pub fn completion_content(response: &Value) -> Option<&str> {
    response.pointer("/choices/0/message/content")?.as_str()
}

#[async_trait]
impl AnalysisUpstream for XaiClient {
    async fn analyze(&self, api_key: &str, image_url: &str, prompt: &str) -> StudioResult<String> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.request_body(image_url, prompt))
            .send()
            .await?;

        let status = response.status();
        info!(status = status.as_u16(), "analysis upstream responded");
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = status.as_u16(), "analysis upstream error");
            let message = upstream_error_message(&body).unwrap_or_else(|| "API request failed".to_string());
            return Err(StudioError::upstream(passthrough(status), message));
        }

        let data: Value = serde_json::from_str(&body)?;
        completion_content(&data)
            .map(str::to_string)
            .ok_or(StudioError::Parse { content: body })
    }
}

/// `generateContent` endpoint at `generativelanguage.googleapis.com`.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn request_body(image: &DataUri, instruction: &str) -> Value {
        json!({
            "contents": [{
                "parts": [
                    { "inline_data": { "mime_type": image.mime_type, "data": image.data } },
                    { "text": instruction }
                ]
            }],
            "generationConfig": { "responseModalities": ["TEXT", "IMAGE"] }
        })
    }
}

/// First inline image in a `generateContent` response.
pub fn first_inline_image(response: &Value) -> Option<DataUri> {
    let parts = response.pointer("/candidates/0/content/parts")?.as_array()?;
    parts.iter().find_map(|part| {
        let inline = part.get("inlineData")?;
        Some(DataUri {
            mime_type: inline.get("mimeType")?.as_str()?.to_string(),
            data: inline.get("data")?.as_str()?.to_string(),
        })
    })
}

#[async_trait]
impl EditUpstream for GeminiClient {
    async fn edit(&self, api_key: &str, image: &DataUri, instruction: &str) -> StudioResult<Option<DataUri>> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .json(&Self::request_body(image, instruction))
            .send()
            .await?;

        let status = response.status();
        info!(status = status.as_u16(), "edit upstream responded");
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = status.as_u16(), "edit upstream error");
            return Err(StudioError::upstream(passthrough(status), "Gemini API request failed").with_details(body));
        }

        let data: Value = serde_json::from_str(&body)?;
        let edited = first_inline_image(&data);
        debug!(found = edited.is_some(), "edit upstream image part");
        Ok(edited)
    }
}

// reqwest and axum may pin different `http` majors; go through the numeric code
fn passthrough(status: reqwest::StatusCode) -> StatusCode {
    StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY)
}
