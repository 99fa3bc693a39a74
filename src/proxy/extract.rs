//! Pull a JSON object out of free-form model output.
//!
//! Models are asked for raw JSON but often wrap it in prose or code fences. The
//! extraction order is:
//! 1. the first balanced `{...}` block (string and escape aware) that parses
//! 2. everything from the first `{` to the last `}`
//! 3. the whole text
//!
//! If none of these parse, the exchange is a parse failure.

use serde_json::Value;
use tracing::warn;

use crate::error::{StudioError, StudioResult};

/// Extract the JSON value embedded in `text`.
pub fn extract_json_object(text: &str) -> StudioResult<Value> {
    for (start, _) in text.match_indices('{') {
        if let Some(end) = matching_brace(text, start) {
            if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
                return Ok(value);
            }
        }
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
                return Ok(value);
            }
        }
    }

    serde_json::from_str::<Value>(text.trim()).map_err(|_| {
        warn!(len = text.len(), "model response contained no JSON object");
        StudioError::Parse {
            content: text.to_string(),
        }
    })
}

/// Byte index of the `}` closing the `{` at `start`, skipping braces inside strings.
fn matching_brace(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}
