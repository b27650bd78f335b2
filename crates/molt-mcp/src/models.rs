//! MCP request types.
//!
//! These types define the arguments of the molt-md MCP tools.

use molt_client::{EntryKind, WorkspaceEntry};
use rmcp::schemars;
use serde::{Deserialize, Serialize};

// ============================================================================
// Document Requests
// ============================================================================

/// Read a document.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReadDocRequest {
    #[schemars(description = "UUID of the document to read")]
    pub doc_id: String,
    #[schemars(description = "Return only the first N lines (for previews)")]
    pub lines: Option<u32>,
    #[schemars(
        description = "Return plain markdown with a version header instead of JSON with metadata (default: false)"
    )]
    #[serde(default)]
    pub as_markdown: bool,
}

/// Create a document.
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct CreateDocRequest {
    #[schemars(description = "Initial markdown content (optional)")]
    #[serde(default)]
    pub content: String,
}

/// Replace or append document content.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WriteDocRequest {
    #[schemars(description = "UUID of the document")]
    pub doc_id: String,
    #[schemars(description = "Markdown content")]
    pub content: String,
    #[schemars(
        description = "Version ETag from the last read (e.g. 'v5'); the write fails with a conflict if the document changed since"
    )]
    pub if_match: Option<String>,
}

/// Delete a document.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteDocRequest {
    #[schemars(description = "UUID of the document to delete")]
    pub doc_id: String,
}

// ============================================================================
// Workspace Requests
// ============================================================================

/// Kind of item a workspace entry refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, schemars::JsonSchema)]
pub enum EntryType {
    #[serde(rename = "md")]
    Md,
    #[serde(rename = "workspace")]
    Workspace,
}

/// One document or sub-workspace bundled in a workspace.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EntryArg {
    #[serde(rename = "type")]
    #[schemars(description = "'md' for a document, 'workspace' for a sub-workspace")]
    pub kind: EntryType,
    #[schemars(description = "UUID of the document or workspace")]
    pub id: String,
    #[schemars(description = "Write or read key for the item")]
    pub key: String,
}

impl From<EntryArg> for WorkspaceEntry {
    fn from(entry: EntryArg) -> Self {
        let kind = match entry.kind {
            EntryType::Md => EntryKind::Document,
            EntryType::Workspace => EntryKind::Workspace,
        };
        WorkspaceEntry {
            kind,
            id: entry.id,
            key: entry.key,
        }
    }
}

/// Read a workspace.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReadWorkspaceRequest {
    #[schemars(description = "UUID of the workspace to read")]
    pub workspace_id: String,
    #[schemars(description = "Include a preview of the first N lines of each document entry")]
    pub preview_lines: Option<u32>,
}

/// Create a workspace.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateWorkspaceRequest {
    #[schemars(description = "Human-readable workspace name")]
    pub name: String,
    #[schemars(description = "Entries to bundle (default: none)")]
    #[serde(default)]
    pub entries: Vec<EntryArg>,
}

/// Replace a workspace's name and entries.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateWorkspaceRequest {
    #[schemars(description = "UUID of the workspace to update")]
    pub workspace_id: String,
    #[schemars(description = "New workspace name")]
    pub name: String,
    #[schemars(description = "New entry list (replaces existing entries)")]
    pub entries: Vec<EntryArg>,
    #[schemars(description = "Version ETag from the last read (e.g. 'v1') to prevent conflicts")]
    pub if_match: Option<String>,
}

/// Delete a workspace.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteWorkspaceRequest {
    #[schemars(description = "UUID of the workspace to delete")]
    pub workspace_id: String,
}
