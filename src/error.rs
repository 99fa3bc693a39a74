//! # Error Handling
//!
//! Every failure in the studio falls into one of three families:
//!
//! - **Input validation** (missing image, malformed data URI, wrong method): 4xx
//! - **Upstream/service** (network failure, non-2xx from the vision API, unparsable
//!   model output): upstream status or 5xx
//! - **Configuration** (missing API key): 500, raised when the endpoint is called
//!   rather than at start-up
//!
//! Nothing is retried. A failed request has to be re-initiated by the user.
//!
//! ## Usage
//!
//! ```rust
//! use portrait_studio::error::StudioError;
//!
//! let error = StudioError::missing_credential("XAI_API_KEY");
//! assert_eq!(error.category(), "config");
//! assert_eq!(error.status().as_u16(), 500);
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudioError {
    /// Request body failed validation
    #[error("{message}")]
    Validation { message: String },

    /// A required secret is not configured
    #[error("API key not configured")]
    MissingCredential { variable: String },

    /// Upstream answered with a non-success status
    #[error("{message}")]
    Upstream {
        status: StatusCode,
        message: String,
        details: Option<String>,
    },

    /// Network-level failure talking to the upstream
    #[error("Upstream request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The model's answer contained no usable JSON object
    #[error("Failed to parse AI response")]
    Parse { content: String },

    /// Local storage failure
    #[error("I/O error during {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Compose(#[from] studio_compose::ComposeError),
}

/// Convenience alias for results in this crate
pub type StudioResult<T> = Result<T, StudioError>;

impl StudioError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a missing-credential error naming the environment variable
    pub fn missing_credential(variable: impl Into<String>) -> Self {
        Self::MissingCredential {
            variable: variable.into(),
        }
    }

    /// Create an upstream error carrying the upstream status
    pub fn upstream(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
            details: None,
        }
    }

    /// Attach raw upstream details to an upstream error
    pub fn with_details(mut self, raw: impl Into<String>) -> Self {
        if let Self::Upstream { details, .. } = &mut self {
            *details = Some(raw.into());
        }
        self
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::MissingCredential { .. } => "config",
            Self::Upstream { .. } | Self::Network(_) => "upstream",
            Self::Parse { .. } | Self::Json(_) => "parse",
            Self::Io { .. } => "io",
            Self::Compose(_) => "image",
        }
    }

    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Compose(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { status, .. } => *status,
            Self::MissingCredential { .. }
            | Self::Network(_)
            | Self::Parse { .. }
            | Self::Io { .. }
            | Self::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StudioError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::MissingCredential { variable } => json!({
                "error": self.to_string(),
                "hint": format!("Make sure {variable} is set in the server environment"),
            }),
            Self::Upstream {
                details: Some(details),
                ..
            } => json!({ "error": self.to_string(), "details": details }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
