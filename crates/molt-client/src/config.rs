//! Connection settings for [`MoltClient`](crate::MoltClient).

use std::fmt;
use std::time::Duration;

use crate::constants::{DEFAULT_BASE_URL, REQUEST_TIMEOUT};

/// Where and how to reach the molt-md API.
///
/// The API key is either a write key or a read key; the server decides what
/// it may do. When `workspace_id` is set, document requests are resolved
/// through that workspace's key.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub workspace_id: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Config for the public API with the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            workspace_id: None,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Scope requests to a workspace. Blank IDs leave the config unscoped.
    pub fn with_workspace(mut self, workspace_id: impl Into<String>) -> Self {
        let id = workspace_id.into();
        let id = id.trim();
        self.workspace_id = (!id.is_empty()).then(|| id.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Key with everything past the first four characters hidden.
    pub fn masked_key(&self) -> String {
        if self.api_key.chars().count() <= 4 {
            return "****".to_string();
        }
        let prefix: String = self.api_key.chars().take(4).collect();
        format!("{prefix}…")
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.masked_key())
            .field("workspace_id", &self.workspace_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}
