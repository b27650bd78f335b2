//! Client configuration constants.
//!
//! Centralizes wire-level names and limits of the molt-md API.

use std::time::Duration;

/// Public molt-md API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://molt-md.com/api/v1";

/// Per-request timeout, covering connect and body transfer.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the document or workspace key.
pub const KEY_HEADER: &str = "X-Molt-Key";

/// Header scoping document access through a workspace.
pub const WORKSPACE_HEADER: &str = "X-Molt-Workspace";

/// Set to `true` when a `lines`-limited read cut the document short.
pub const TRUNCATED_HEADER: &str = "X-Molt-Truncated";

/// Total line count of the full document on truncated reads.
pub const TOTAL_LINES_HEADER: &str = "X-Molt-Total-Lines";

/// Server-side cap on document content.
pub const MAX_CONTENT_MB: u32 = 5;

/// Error bodies longer than this are cut before being shown to the caller.
pub const MAX_ERROR_DETAIL_CHARS: usize = 500;

pub const MARKDOWN_MIME: &str = "text/markdown";
pub const JSON_MIME: &str = "application/json";
