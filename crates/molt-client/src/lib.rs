//! molt-md REST client library
//!
//! Typed async access to the molt-md encrypted markdown hosting API:
//! documents, workspaces, health and metrics. Encryption, versioning and
//! permission checks all happen server-side; this crate builds requests,
//! validates IDs, and turns HTTP failures into actionable messages.

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use reqwest::Method;

pub use client::{MoltClient, Payload, RequestOptions};
pub use config::ClientConfig;
pub use error::{ClientError, error_detail, format_http_error};
pub use ids::{DOCUMENT_ID, WORKSPACE_ID, format_if_match, validate_uuid};
pub use types::{ApiResponse, Body, DocFormat, EntryKind, ResponseMeta, WorkspaceEntry};
