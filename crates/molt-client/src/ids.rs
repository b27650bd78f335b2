//! Identifier and version-token handling.

use uuid::Uuid;

use crate::error::ClientError;

pub const DOCUMENT_ID: &str = "document ID";
pub const WORKSPACE_ID: &str = "workspace ID";

/// Length of the canonical `8-4-4-4-12` hyphenated form.
const HYPHENATED_LEN: usize = 36;

/// Parse a resource ID, accepting only the hyphenated UUID form.
///
/// `Uuid::try_parse` also takes simple, braced and URN forms; the API does not.
pub fn validate_uuid(value: &str, label: &'static str) -> Result<Uuid, ClientError> {
    let invalid = || ClientError::InvalidId {
        label,
        value: value.to_string(),
    };

    if value.len() != HYPHENATED_LEN {
        return Err(invalid());
    }
    Uuid::try_parse(value).map_err(|_| invalid())
}

/// Normalize a caller-supplied version into an `If-Match` header value.
///
/// Accepts `v5`, `"v5"`, or over-quoted input and always yields `"v5"`.
pub fn format_if_match(version: Option<&str>) -> Option<String> {
    let bare = version?.trim().trim_matches('"');
    if bare.is_empty() {
        return None;
    }
    Some(format!("\"{bare}\""))
}

/// Strip quoting and the weak-validator prefix from an `ETag` header.
pub fn etag_version(etag: &str) -> &str {
    etag.trim().trim_start_matches("W/").trim_matches('"')
}
