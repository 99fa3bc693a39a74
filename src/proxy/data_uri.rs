//! `data:image/<subtype>;base64,<payload>` strings as sent by the upload pages.

use std::fmt;

use base64::{Engine as _, engine::general_purpose};

use crate::error::{StudioError, StudioResult};

/// A parsed image data URI. The payload is kept base64-encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataUri {
    /// Full media type, e.g. `image/png`
    pub mime_type: String,
    /// Base64 payload without the header
    pub data: String,
}

impl DataUri {
    /// Parse an image data URI.
    ///
    /// The subtype must be word characters only (`png`, `jpeg`, `webp`, ...) and the
    /// payload must be non-empty. Anything else is an "Invalid image format" error.
    pub fn parse(input: &str) -> StudioResult<Self> {
        let invalid = || StudioError::validation("Invalid image format");

        let rest = input.strip_prefix("data:image/").ok_or_else(invalid)?;
        let (subtype, payload) = rest.split_once(";base64,").ok_or_else(invalid)?;

        let word = |c: char| c.is_ascii_alphanumeric() || c == '_';
        if subtype.is_empty() || !subtype.chars().all(word) || payload.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            mime_type: format!("image/{subtype}"),
            data: payload.to_string(),
        })
    }

    /// Build a data URI from raw bytes.
    pub fn encode(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Decode the payload back into bytes.
    pub fn decode(&self) -> StudioResult<Vec<u8>> {
        general_purpose::STANDARD
            .decode(self.data.trim())
            .map_err(|e| StudioError::validation(format!("Invalid base64 payload: {e}")))
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.data)
    }
}
