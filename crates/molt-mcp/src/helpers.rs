//! Response shaping for tool output.

use molt_client::{ApiResponse, Body, ClientConfig, ResponseMeta, WorkspaceEntry};

use crate::models::EntryArg;

/// Render a document read: JSON pretty-printed, markdown with its header.
pub fn render_document(response: &ApiResponse, lines: Option<u32>) -> String {
    match &response.body {
        Body::Text(content) => markdown_with_header(content, &response.meta, lines),
        Body::Json(_) => response.body.render(),
    }
}

/// Prefix markdown with the version and any truncation notice.
///
/// In markdown mode the version only travels in the `ETag` header, so it is
/// surfaced here for the caller to pass back as `if_match`. Content with no
/// metadata to report is returned unchanged.
pub fn markdown_with_header(content: &str, meta: &ResponseMeta, lines: Option<u32>) -> String {
    let mut header = Vec::new();

    if let Some(version) = meta.version() {
        header.push(format!("version: {version}"));
    }

    if meta.truncated {
        let notice = match (lines.filter(|n| *n > 0), meta.total_lines) {
            (Some(shown), Some(total)) => {
                format!("truncated: showing first {shown} of {total} lines")
            }
            (None, Some(total)) => format!("truncated: document has {total} lines"),
            (_, None) => "truncated: partial content".to_string(),
        };
        header.push(notice);
    }

    if header.is_empty() {
        return content.to_string();
    }

    format!("{}\n---\n{}", header.join("\n"), content)
}

pub fn into_entries(entries: Vec<EntryArg>) -> Vec<WorkspaceEntry> {
    entries.into_iter().map(WorkspaceEntry::from).collect()
}

/// Which endpoint and credentials this server is using, key masked.
pub fn connection_summary(config: &ClientConfig) -> String {
    let summary = serde_json::json!({
        "base_url": config.base_url,
        "workspace_id": config.workspace_id,
        "key": config.masked_key(),
        "timeout_secs": config.timeout.as_secs(),
    });
    serde_json::to_string_pretty(&summary).unwrap_or_else(|_| summary.to_string())
}
