//! Client errors and the caller-facing explanations of API status codes.

use reqwest::Method;
use serde_json::Value;

use crate::constants::{MAX_CONTENT_MB, MAX_ERROR_DETAIL_CHARS};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{label} '{value}' is not a valid UUID")]
    InvalidId { label: &'static str, value: String },
    /// Non-2xx reply; `message` is already phrased for the caller.
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Invalid JSON in response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid value for header {0}")]
    Header(&'static str),
    #[error("failed to create HTTP client: {0}")]
    Build(String),
}

impl ClientError {
    /// HTTP status of an API rejection, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Explain an HTTP error status in terms of what the caller should do next.
///
/// `detail` is the server's own message (see [`error_detail`]) and is appended
/// when non-empty. 403 is worded differently for mutating requests, since the
/// usual cause there is a read key being used for a write.
pub fn format_http_error(status: u16, detail: &str, method: &Method, path: &str) -> String {
    let base = match status {
        400 => "Bad request: the API rejected the parameters".to_string(),
        403 if !method.is_safe() => "Permission denied: this operation requires a write key, \
             and the configured key is read-only or does not belong to this resource"
            .to_string(),
        403 => "Permission denied: the configured key is invalid for this resource".to_string(),
        404 => format!("Not found: {path} does not exist or was deleted"),
        409 => "Version conflict: the resource changed since it was last read. \
             Re-read it to get the current version, then retry with that ETag"
            .to_string(),
        413 => format!("Payload too large: content exceeds the {MAX_CONTENT_MB} MB limit"),
        429 => "Rate limit exceeded: too many requests, wait before retrying".to_string(),
        _ => format!("HTTP {status} from {method} {path}"),
    };

    if detail.is_empty() {
        base
    } else {
        format!("{base} ({detail})")
    }
}

/// Pull a human-readable detail out of an error response body.
///
/// JSON bodies contribute `message` (or `error` when the message is missing or
/// not a string) and the server's `current_version` on conflicts. Anything
/// else is used as text. Either way the detail is capped at
/// [`MAX_ERROR_DETAIL_CHARS`].
pub fn error_detail(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => {
            let mut parts = Vec::new();
            let text = |key: &str| {
                map.get(key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
            };
            if let Some(text) = text("message").or_else(|| text("error")) {
                parts.push(text.to_string());
            }
            if let Some(version) = map.get("current_version") {
                let version = version
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| version.to_string());
                parts.push(format!("current version: {version}"));
            }
            cap(&parts.join("; "))
        }
        _ => cap(trimmed),
    }
}

fn cap(detail: &str) -> String {
    detail.chars().take(MAX_ERROR_DETAIL_CHARS).collect()
}
