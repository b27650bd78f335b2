//! HTTP client for the molt-md REST API.
//!
//! One [`MoltClient`] wraps a pooled `reqwest::Client` whose default headers
//! carry the key (and workspace scope). Every operation is a single request;
//! conflicts, permissions and limits are enforced by the server and relayed
//! back as [`ClientError::Http`].

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};

use crate::config::ClientConfig;
use crate::constants::{KEY_HEADER, MARKDOWN_MIME, WORKSPACE_HEADER};
use crate::error::{ClientError, error_detail, format_http_error};
use crate::ids::{DOCUMENT_ID, WORKSPACE_ID, format_if_match, validate_uuid};
use crate::types::{ApiResponse, Body, DocFormat, ResponseMeta, WorkspaceEntry};

/// Request body variants the API accepts.
#[derive(Debug, Clone)]
pub enum Payload {
    Json(Value),
    Markdown(String),
}

/// Per-request extras layered over the client's default headers.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    query: Vec<(&'static str, String)>,
    headers: Vec<(&'static str, String)>,
    payload: Option<Payload>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, name: &'static str, value: impl ToString) -> Self {
        self.query.push((name, value.to_string()));
        self
    }

    /// Add a positive count parameter; zero and `None` are omitted.
    pub fn limit(self, name: &'static str, value: Option<u32>) -> Self {
        match value.filter(|n| *n > 0) {
            Some(n) => self.query(name, n),
            None => self,
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Optimistic-concurrency guard; blank versions send no header.
    pub fn if_match(self, version: Option<&str>) -> Self {
        match format_if_match(version) {
            Some(value) => self.header("If-Match", value),
            None => self,
        }
    }

    pub fn json(mut self, value: Value) -> Self {
        self.payload = Some(Payload::Json(value));
        self
    }

    pub fn markdown(mut self, content: impl Into<String>) -> Self {
        self.payload = Some(Payload::Markdown(content.into()));
        self
    }
}

#[derive(Clone)]
pub struct MoltClient {
    http: Client,
    config: Arc<ClientConfig>,
}

impl std::fmt::Debug for MoltClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoltClient")
            .field("config", &self.config)
            .finish()
    }
}

impl MoltClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();

        let mut key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| ClientError::Header(KEY_HEADER))?;
        key.set_sensitive(true);
        headers.insert(KEY_HEADER, key);

        if let Some(workspace) = &config.workspace_id {
            let value = HeaderValue::from_str(workspace)
                .map_err(|_| ClientError::Header(WORKSPACE_HEADER))?;
            headers.insert(WORKSPACE_HEADER, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .user_agent(concat!("molt-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        tracing::debug!(?config, "HTTP client ready");

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    /// Issue one request and decode the reply.
    ///
    /// 204 becomes `{"success": true}`, JSON content types decode to
    /// [`Body::Json`], anything else is returned as text.
    #[tracing::instrument(skip_all, fields(method = %method, path = %path))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        let mut builder = self.http.request(method.clone(), self.url(path));

        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        for (name, value) in options.headers {
            builder = builder.header(name, value);
        }
        builder = match options.payload {
            Some(Payload::Json(value)) => builder.json(&value),
            Some(Payload::Markdown(content)) => {
                builder.header(CONTENT_TYPE, MARKDOWN_MIME).body(content)
            }
            None => builder,
        };

        let response = builder.send().await.inspect_err(|e| {
            tracing::error!(error = %e, "request failed");
        })?;

        let status = response.status();
        let meta = ResponseMeta::from_headers(response.headers());
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format_http_error(status.as_u16(), &error_detail(&body), &method, path);
            tracing::warn!(status = status.as_u16(), %message, "API rejected request");
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }

        // 204 carries no body, whatever its content type claims
        let body = if status == StatusCode::NO_CONTENT {
            Body::Json(json!({ "success": true }))
        } else if content_type.contains("application/json") {
            let text = response.text().await?;
            Body::Json(serde_json::from_str(&text)?)
        } else {
            Body::Text(response.text().await?)
        };

        tracing::debug!(status = status.as_u16(), "request complete");

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
            meta,
        })
    }

    // ========================================================================
    // Service
    // ========================================================================

    pub async fn health(&self) -> Result<ApiResponse, ClientError> {
        self.request(Method::GET, "/health", RequestOptions::new()).await
    }

    /// Document and workspace totals. Needs no key.
    pub async fn metrics(&self) -> Result<ApiResponse, ClientError> {
        self.request(Method::GET, "/metrics", RequestOptions::new()).await
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Read a document, optionally only its first `lines` lines.
    pub async fn read_doc(
        &self,
        doc_id: &str,
        lines: Option<u32>,
        format: DocFormat,
    ) -> Result<ApiResponse, ClientError> {
        let id = validate_uuid(doc_id, DOCUMENT_ID)?;
        let options = RequestOptions::new()
            .header("Accept", format.accept())
            .limit("lines", lines);
        self.request(Method::GET, &format!("/docs/{id}"), options).await
    }

    /// Create a document. The reply holds the only copy of its write and read keys.
    pub async fn create_doc(&self, content: &str) -> Result<ApiResponse, ClientError> {
        let body = if content.is_empty() {
            json!({})
        } else {
            json!({ "content": content })
        };
        self.request(Method::POST, "/docs", RequestOptions::new().json(body))
            .await
    }

    /// Replace the whole document.
    pub async fn update_doc(
        &self,
        doc_id: &str,
        content: &str,
        if_match: Option<&str>,
    ) -> Result<ApiResponse, ClientError> {
        let id = validate_uuid(doc_id, DOCUMENT_ID)?;
        let options = RequestOptions::new().markdown(content).if_match(if_match);
        self.request(Method::PUT, &format!("/docs/{id}"), options).await
    }

    /// Append to the end of the document; the server inserts the separating newline.
    pub async fn append_doc(
        &self,
        doc_id: &str,
        content: &str,
        if_match: Option<&str>,
    ) -> Result<ApiResponse, ClientError> {
        let id = validate_uuid(doc_id, DOCUMENT_ID)?;
        let options = RequestOptions::new().markdown(content).if_match(if_match);
        self.request(Method::PATCH, &format!("/docs/{id}"), options).await
    }

    pub async fn delete_doc(&self, doc_id: &str) -> Result<ApiResponse, ClientError> {
        let id = validate_uuid(doc_id, DOCUMENT_ID)?;
        self.request(Method::DELETE, &format!("/docs/{id}"), RequestOptions::new())
            .await
    }

    // ========================================================================
    // Workspaces
    // ========================================================================

    /// Read a workspace's name and entries, with optional per-document previews.
    pub async fn read_workspace(
        &self,
        workspace_id: &str,
        preview_lines: Option<u32>,
    ) -> Result<ApiResponse, ClientError> {
        let id = validate_uuid(workspace_id, WORKSPACE_ID)?;
        let options = RequestOptions::new().limit("preview_lines", preview_lines);
        self.request(Method::GET, &format!("/workspaces/{id}"), options).await
    }

    pub async fn create_workspace(
        &self,
        name: &str,
        entries: &[WorkspaceEntry],
    ) -> Result<ApiResponse, ClientError> {
        let body = json!({ "name": name, "entries": entries });
        self.request(Method::POST, "/workspaces", RequestOptions::new().json(body))
            .await
    }

    /// Replace the workspace's name and full entry list.
    pub async fn update_workspace(
        &self,
        workspace_id: &str,
        name: &str,
        entries: &[WorkspaceEntry],
        if_match: Option<&str>,
    ) -> Result<ApiResponse, ClientError> {
        let id = validate_uuid(workspace_id, WORKSPACE_ID)?;
        let options = RequestOptions::new()
            .json(json!({ "name": name, "entries": entries }))
            .if_match(if_match);
        self.request(Method::PUT, &format!("/workspaces/{id}"), options).await
    }

    /// Delete the workspace only; referenced documents and sub-workspaces survive.
    pub async fn delete_workspace(&self, workspace_id: &str) -> Result<ApiResponse, ClientError> {
        let id = validate_uuid(workspace_id, WORKSPACE_ID)?;
        self.request(
            Method::DELETE,
            &format!("/workspaces/{id}"),
            RequestOptions::new(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, Reply};
    use crate::types::EntryKind;

    const DOC: &str = "123e4567-e89b-12d3-a456-426614174000";

    async fn client_for(api: &FakeApi) -> MoltClient {
        MoltClient::new(api.config("test-key")).unwrap()
    }

    #[tokio::test]
    async fn test_json_response() {
        let api = FakeApi::start().await;
        api.on(Method::GET, "/health", Reply::json(200, json!({"status": "ok"})));

        let resp = client_for(&api).await.health().await.unwrap();
        assert_eq!(resp.body, Body::Json(json!({"status": "ok"})));
    }

    #[tokio::test]
    async fn test_auth_headers_sent() {
        let api = FakeApi::start().await;
        api.on(Method::GET, "/metrics", Reply::json(200, json!({"documents": 1})));

        let config = api.config("wk_abc").with_workspace("ws-123");
        MoltClient::new(config).unwrap().metrics().await.unwrap();

        let req = api.last_request().unwrap();
        assert_eq!(req.header("x-molt-key"), Some("wk_abc"));
        assert_eq!(req.header("x-molt-workspace"), Some("ws-123"));
    }

    #[tokio::test]
    async fn test_no_workspace_header_when_unscoped() {
        let api = FakeApi::start().await;
        api.on(Method::GET, "/health", Reply::json(200, json!({"status": "ok"})));

        client_for(&api).await.health().await.unwrap();
        assert_eq!(api.last_request().unwrap().header("x-molt-workspace"), None);
    }

    #[tokio::test]
    async fn test_204_no_content() {
        let api = FakeApi::start().await;
        api.on(Method::DELETE, &format!("/docs/{DOC}"), Reply::empty(204));

        let resp = client_for(&api).await.delete_doc(DOC).await.unwrap();
        assert_eq!(resp.body, Body::Json(json!({"success": true})));
    }

    #[tokio::test]
    async fn test_204_with_json_content_type() {
        let api = FakeApi::start().await;
        api.on(
            Method::DELETE,
            &format!("/workspaces/{DOC}"),
            Reply::empty(204).header("content-type", "application/json"),
        );

        let resp = client_for(&api).await.delete_workspace(DOC).await.unwrap();
        assert_eq!(resp.status, 204);
        assert_eq!(resp.body, Body::Json(json!({"success": true})));
    }

    #[tokio::test]
    async fn test_text_response() {
        let api = FakeApi::start().await;
        api.on(Method::GET, &format!("/docs/{DOC}"), Reply::markdown(200, "# Hello"));

        let resp = client_for(&api)
            .await
            .read_doc(DOC, None, DocFormat::Markdown)
            .await
            .unwrap();
        assert_eq!(resp.body, Body::Text("# Hello".to_string()));
        assert_eq!(api.last_request().unwrap().header("accept"), Some("text/markdown"));
    }

    #[tokio::test]
    async fn test_lines_query_only_when_positive() {
        let api = FakeApi::start().await;
        api.on(Method::GET, &format!("/docs/{DOC}"), Reply::markdown(200, "# Line 1"));
        let client = client_for(&api).await;

        client.read_doc(DOC, Some(5), DocFormat::Markdown).await.unwrap();
        assert_eq!(api.last_request().unwrap().query.as_deref(), Some("lines=5"));

        client.read_doc(DOC, Some(0), DocFormat::Json).await.unwrap();
        let req = api.last_request().unwrap();
        assert_eq!(req.query, None);
        assert_eq!(req.header("accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_403_error_on_write() {
        let api = FakeApi::start().await;
        api.on(
            Method::PUT,
            &format!("/docs/{DOC}"),
            Reply::json(403, json!({"error": "forbidden", "message": "Write key required"})),
        );

        let err = client_for(&api)
            .await
            .update_doc(DOC, "new content", None)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert!(err.to_string().to_lowercase().contains("write key"));
    }

    #[tokio::test]
    async fn test_409_conflict() {
        let api = FakeApi::start().await;
        api.on(
            Method::PUT,
            &format!("/docs/{DOC}"),
            Reply::json(409, json!({"error": "conflict", "current_version": 6})),
        );

        let err = client_for(&api)
            .await
            .update_doc(DOC, "x", Some("v5"))
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.to_lowercase().contains("conflict"));
        assert!(msg.contains("current version: 6"));
    }

    #[tokio::test]
    async fn test_update_sends_markdown_and_if_match() {
        let api = FakeApi::start().await;
        api.on(
            Method::PUT,
            &format!("/docs/{DOC}"),
            Reply::json(200, json!({"success": true, "version": 3})),
        );

        client_for(&api)
            .await
            .update_doc(DOC, "# Updated", Some("v2"))
            .await
            .unwrap();

        let req = api.last_request().unwrap();
        assert_eq!(req.header("content-type"), Some("text/markdown"));
        assert_eq!(req.header("if-match"), Some("\"v2\""));
        assert_eq!(req.text(), "# Updated");
    }

    #[tokio::test]
    async fn test_append_uses_patch() {
        let api = FakeApi::start().await;
        api.on(
            Method::PATCH,
            &format!("/docs/{DOC}"),
            Reply::json(200, json!({"success": true, "version": 4})),
        );

        client_for(&api)
            .await
            .append_doc(DOC, "## More", None)
            .await
            .unwrap();

        let req = api.last_request().unwrap();
        assert_eq!(req.method, Method::PATCH);
        assert_eq!(req.header("if-match"), None);
    }

    #[tokio::test]
    async fn test_create_doc_body() {
        let api = FakeApi::start().await;
        api.on(
            Method::POST,
            "/docs",
            Reply::json(201, json!({"id": DOC, "write_key": "wk", "read_key": "rk"})),
        );
        let client = client_for(&api).await;

        client.create_doc("# New").await.unwrap();
        assert_eq!(api.last_request().unwrap().json(), json!({"content": "# New"}));

        client.create_doc("").await.unwrap();
        assert_eq!(api.last_request().unwrap().json(), json!({}));
    }

    #[tokio::test]
    async fn test_workspace_body_and_preview() {
        let api = FakeApi::start().await;
        let ws = "223e4567-e89b-12d3-a456-426614174000";
        api.on(
            Method::PUT,
            &format!("/workspaces/{ws}"),
            Reply::json(200, json!({"success": true, "version": 2})),
        );
        api.on(
            Method::GET,
            &format!("/workspaces/{ws}"),
            Reply::json(200, json!({"id": ws, "name": "X", "entries": [], "version": 1})),
        );
        let client = client_for(&api).await;

        let entries = vec![WorkspaceEntry {
            kind: EntryKind::Document,
            id: DOC.to_string(),
            key: "dockey".to_string(),
        }];
        client
            .update_workspace(ws, "Proj", &entries, Some("v1"))
            .await
            .unwrap();
        let req = api.last_request().unwrap();
        assert_eq!(
            req.json(),
            json!({"name": "Proj", "entries": [{"type": "md", "id": DOC, "key": "dockey"}]})
        );
        assert_eq!(req.header("if-match"), Some("\"v1\""));

        client.read_workspace(ws, Some(2)).await.unwrap();
        assert_eq!(api.last_request().unwrap().query.as_deref(), Some("preview_lines=2"));
    }

    #[tokio::test]
    async fn test_invalid_id_sends_nothing() {
        let api = FakeApi::start().await;
        let client = client_for(&api).await;

        let err = client.delete_workspace("nope").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidId { label: WORKSPACE_ID, .. }));
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn test_network_error() {
        let config = ClientConfig::new("k").with_base_url(FakeApi::unreachable_url().await);
        let err = MoltClient::new(config).unwrap().health().await.unwrap_err();
        assert!(matches!(err, ClientError::Request(_)));
        assert!(err.to_string().to_lowercase().contains("request error"));
    }

    #[test]
    fn test_key_with_newline_rejected() {
        let err = MoltClient::new(ClientConfig::new("bad\nkey")).unwrap_err();
        assert!(matches!(err, ClientError::Header(KEY_HEADER)));
    }
}
