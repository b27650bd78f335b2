//! MCP server exposing the molt-md encrypted markdown API.
//!
//! Each tool maps onto one REST call made through [`molt_client::MoltClient`].
//! Results come back as text: pretty JSON for API objects, markdown for
//! document reads in markdown mode, and a prefixed explanation on failure.
//!
//! ## Module Structure
//!
//! - `models`: Request types for MCP tools
//! - `helpers`: Response shaping

mod helpers;
mod models;

use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use molt_client::{ClientConfig, ClientError, DocFormat, MoltClient};

// Re-export public types
pub use models::*;
use helpers::*;

const INSTRUCTIONS: &str = "molt-md MCP server. Reads and writes end-to-end encrypted markdown \
documents and workspaces hosted on molt-md. Write keys allow every tool; read keys allow only \
reads, and writes fail with a permission error. Document reads return a version (ETag); pass it \
as if_match on update_doc, append_doc or update_workspace to avoid overwriting concurrent edits. \
create_doc and create_workspace return a write key and a read key that are shown only once.";

/// MCP server exposing molt-md documents and workspaces.
#[derive(Clone)]
pub struct MoltMcp {
    client: MoltClient,
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for MoltMcp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoltMcp")
            .field("client", &self.client)
            .field("tool_router", &self.tool_router)
            .finish()
    }
}

impl MoltMcp {
    /// Create a server around an existing client.
    pub fn with_client(client: MoltClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    /// Create a server from connection settings.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::with_client(MoltClient::new(config)?))
    }

    pub fn client(&self) -> &MoltClient {
        &self.client
    }
}

#[tool_router]
impl MoltMcp {
    // ========================================================================
    // Service Tools
    // ========================================================================

    #[tool(description = "Check if the molt-md API is available and responding.")]
    #[tracing::instrument(skip(self), name = "mcp.health_check")]
    pub async fn health_check(&self) -> String {
        match self.client.health().await {
            Ok(resp) => resp.body.render(),
            Err(e) => format!("Health check failed: {e}"),
        }
    }

    #[tool(description = "Get database statistics (total documents and workspaces count).")]
    #[tracing::instrument(skip(self), name = "mcp.get_metrics")]
    pub async fn get_metrics(&self) -> String {
        match self.client.metrics().await {
            Ok(resp) => resp.body.render(),
            Err(e) => format!("Failed to get metrics: {e}"),
        }
    }

    #[tool(description = "Show which molt-md endpoint and credentials this server uses: base URL, workspace scope, and a masked key prefix.")]
    pub fn connection_info(&self) -> String {
        connection_summary(self.client.config())
    }

    // ========================================================================
    // Document Tools
    // ========================================================================

    #[tool(description = "Read a document's decrypted content. Returns JSON with metadata by default, or plain markdown preceded by a version header when as_markdown is true. Use lines to fetch only the first N lines.")]
    #[tracing::instrument(skip(self, req), name = "mcp.read_doc", fields(doc_id = %req.doc_id))]
    pub async fn read_doc(&self, Parameters(req): Parameters<ReadDocRequest>) -> String {
        let format = if req.as_markdown {
            DocFormat::Markdown
        } else {
            DocFormat::Json
        };

        match self.client.read_doc(&req.doc_id, req.lines, format).await {
            Ok(resp) => render_document(&resp, req.lines),
            Err(e) => format!("Failed to read document: {e}"),
        }
    }

    #[tool(description = "Create a new encrypted document. Returns the document ID with its write and read keys. IMPORTANT: save the keys, they are shown only once.")]
    #[tracing::instrument(skip(self, req), name = "mcp.create_doc")]
    pub async fn create_doc(&self, Parameters(req): Parameters<CreateDocRequest>) -> String {
        match self.client.create_doc(&req.content).await {
            Ok(resp) => {
                tracing::info!("Document created");
                resp.body.render()
            }
            Err(e) => format!("Failed to create document: {e}"),
        }
    }

    #[tool(description = "Replace a document's entire content. Requires a write key. Pass if_match (e.g. 'v5') to fail instead of overwriting concurrent changes.")]
    #[tracing::instrument(skip(self, req), name = "mcp.update_doc", fields(doc_id = %req.doc_id))]
    pub async fn update_doc(&self, Parameters(req): Parameters<WriteDocRequest>) -> String {
        match self
            .client
            .update_doc(&req.doc_id, &req.content, req.if_match.as_deref())
            .await
        {
            Ok(resp) => resp.body.render(),
            Err(e) => format!("Failed to update document: {e}"),
        }
    }

    #[tool(description = "Append content to the end of a document, separated by a newline. Requires a write key. Pass if_match (e.g. 'v5') to guard against concurrent changes.")]
    #[tracing::instrument(skip(self, req), name = "mcp.append_doc", fields(doc_id = %req.doc_id))]
    pub async fn append_doc(&self, Parameters(req): Parameters<WriteDocRequest>) -> String {
        match self
            .client
            .append_doc(&req.doc_id, &req.content, req.if_match.as_deref())
            .await
        {
            Ok(resp) => resp.body.render(),
            Err(e) => format!("Failed to append to document: {e}"),
        }
    }

    #[tool(description = "Permanently delete a document. This cannot be undone. Requires a write key.")]
    #[tracing::instrument(skip(self, req), name = "mcp.delete_doc", fields(doc_id = %req.doc_id))]
    pub async fn delete_doc(&self, Parameters(req): Parameters<DeleteDocRequest>) -> String {
        match self.client.delete_doc(&req.doc_id).await {
            Ok(_) => {
                tracing::info!("Document deleted");
                "Document deleted successfully".to_string()
            }
            Err(e) => format!("Failed to delete document: {e}"),
        }
    }

    // ========================================================================
    // Workspace Tools
    // ========================================================================

    #[tool(description = "Read a workspace's decrypted name and entries. Use preview_lines to include the first N lines of each document entry.")]
    #[tracing::instrument(skip(self, req), name = "mcp.read_workspace", fields(workspace_id = %req.workspace_id))]
    pub async fn read_workspace(&self, Parameters(req): Parameters<ReadWorkspaceRequest>) -> String {
        match self
            .client
            .read_workspace(&req.workspace_id, req.preview_lines)
            .await
        {
            Ok(resp) => resp.body.render(),
            Err(e) => format!("Failed to read workspace: {e}"),
        }
    }

    #[tool(description = "Create an encrypted workspace bundling documents and sub-workspaces. Each entry has type ('md' or 'workspace'), id, and key. Returns the workspace ID with its write and read keys. IMPORTANT: save the keys, they are shown only once.")]
    #[tracing::instrument(skip(self, req), name = "mcp.create_workspace")]
    pub async fn create_workspace(
        &self,
        Parameters(req): Parameters<CreateWorkspaceRequest>,
    ) -> String {
        let entries = into_entries(req.entries);
        match self.client.create_workspace(&req.name, &entries).await {
            Ok(resp) => {
                tracing::info!(entries = entries.len(), "Workspace created");
                resp.body.render()
            }
            Err(e) => format!("Failed to create workspace: {e}"),
        }
    }

    #[tool(description = "Replace a workspace's name and full entry list. Requires a write key. Pass if_match (e.g. 'v1') to guard against concurrent changes.")]
    #[tracing::instrument(skip(self, req), name = "mcp.update_workspace", fields(workspace_id = %req.workspace_id))]
    pub async fn update_workspace(
        &self,
        Parameters(req): Parameters<UpdateWorkspaceRequest>,
    ) -> String {
        let entries = into_entries(req.entries);
        match self
            .client
            .update_workspace(&req.workspace_id, &req.name, &entries, req.if_match.as_deref())
            .await
        {
            Ok(resp) => resp.body.render(),
            Err(e) => format!("Failed to update workspace: {e}"),
        }
    }

    #[tool(description = "Permanently delete a workspace. This cannot be undone. Referenced documents and sub-workspaces are NOT deleted. Requires a write key.")]
    #[tracing::instrument(skip(self, req), name = "mcp.delete_workspace", fields(workspace_id = %req.workspace_id))]
    pub async fn delete_workspace(
        &self,
        Parameters(req): Parameters<DeleteWorkspaceRequest>,
    ) -> String {
        match self.client.delete_workspace(&req.workspace_id).await {
            Ok(_) => {
                tracing::info!("Workspace deleted");
                "Workspace deleted successfully".to_string()
            }
            Err(e) => format!("Failed to delete workspace: {e}"),
        }
    }
}

#[tool_handler]
impl ServerHandler for MoltMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_instructions(INSTRUCTIONS)
    }
}
