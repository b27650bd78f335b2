//! Request and response shapes of the molt-md API.

use reqwest::header::{ETAG, HeaderMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{JSON_MIME, MARKDOWN_MIME, TOTAL_LINES_HEADER, TRUNCATED_HEADER};
use crate::ids::etag_version;

/// What a workspace entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "md")]
    Document,
    #[serde(rename = "workspace")]
    Workspace,
}

/// One item bundled in a workspace: the target's ID and a key that opens it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub id: String,
    pub key: String,
}

/// Representation requested when reading a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocFormat {
    /// Content plus metadata (id, version, ...)
    #[default]
    Json,
    /// Bare markdown; version travels in the `ETag` header
    Markdown,
}

impl DocFormat {
    pub fn accept(&self) -> &'static str {
        match self {
            DocFormat::Json => JSON_MIME,
            DocFormat::Markdown => MARKDOWN_MIME,
        }
    }
}

/// Decoded body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    /// Pretty JSON, or the text as received.
    pub fn render(&self) -> String {
        match self {
            Body::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Body::Text(text) => text.clone(),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }
}

/// Response headers worth surfacing to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    pub etag: Option<String>,
    pub truncated: bool,
    pub total_lines: Option<u64>,
}

impl ResponseMeta {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        Self {
            etag: headers
                .get(ETAG)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            truncated: get(TRUNCATED_HEADER)
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            total_lines: get(TOTAL_LINES_HEADER).and_then(|v| v.trim().parse().ok()),
        }
    }

    /// ETag without quotes, suitable for passing back as `if_match`.
    pub fn version(&self) -> Option<&str> {
        self.etag.as_deref().map(etag_version).filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Body,
    pub meta: ResponseMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_entry_wire_format() {
        let entry = WorkspaceEntry {
            kind: EntryKind::Document,
            id: "223e4567-e89b-12d3-a456-426614174000".to_string(),
            key: "dockey".to_string(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "md",
                "id": "223e4567-e89b-12d3-a456-426614174000",
                "key": "dockey"
            })
        );

        let parsed: WorkspaceEntry =
            serde_json::from_str(r#"{"type": "workspace", "id": "x", "key": "k"}"#).unwrap();
        assert_eq!(parsed.kind, EntryKind::Workspace);
    }

    #[test]
    fn test_meta_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(ETAG, HeaderValue::from_static("\"v3\""));
        headers.insert(TRUNCATED_HEADER, HeaderValue::from_static("true"));
        headers.insert(TOTAL_LINES_HEADER, HeaderValue::from_static("50"));

        let meta = ResponseMeta::from_headers(&headers);
        assert_eq!(meta.version(), Some("v3"));
        assert!(meta.truncated);
        assert_eq!(meta.total_lines, Some(50));
    }

    #[test]
    fn test_meta_defaults_when_absent() {
        let meta = ResponseMeta::from_headers(&HeaderMap::new());
        assert_eq!(meta, ResponseMeta::default());
        assert_eq!(meta.version(), None);
    }

    #[test]
    fn test_render_text_verbatim() {
        assert_eq!(Body::Text("# Hi\n".into()).render(), "# Hi\n");
        let rendered = Body::Json(serde_json::json!({"status": "ok"})).render();
        assert_eq!(rendered, "{\n  \"status\": \"ok\"\n}");
    }
}
