//! molt-md MCP server binary.
//!
//! Exposes the molt-md encrypted markdown API to MCP clients (Claude Code,
//! Gemini CLI, opencode) over stdio.
//!
//! Usage:
//!   MOLT_API_KEY=wk_... cargo run -p molt-mcp
//!
//!   # Scope document access through a workspace key
//!   MOLT_API_KEY=... MOLT_WORKSPACE_ID=<uuid> cargo run -p molt-mcp
//!
//! Test with MCP inspector:
//!   npx @modelcontextprotocol/inspector cargo run -p molt-mcp

use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use tracing_subscriber::{EnvFilter, fmt};

use molt_client::constants::DEFAULT_BASE_URL;
use molt_client::{ClientConfig, WORKSPACE_ID, validate_uuid};
use molt_mcp::MoltMcp;

/// MCP server for the molt-md API.
#[derive(Parser, Debug)]
#[command(name = "molt-mcp")]
#[command(about = "MCP server for the molt-md encrypted markdown API")]
struct Args {
    /// Write or read key for the documents/workspace to access
    #[arg(long, env = "MOLT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Workspace to scope document access through
    #[arg(long, env = "MOLT_WORKSPACE_ID")]
    workspace_id: Option<String>,

    /// API base URL
    #[arg(long, env = "MOLT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,
}

impl Args {
    /// Resolve the client settings, rejecting a missing key or a malformed
    /// workspace ID before anything is served.
    fn into_config(self) -> Result<ClientConfig> {
        let Some(api_key) = self.api_key.filter(|k| !k.trim().is_empty()) else {
            bail!("MOLT_API_KEY environment variable is required");
        };

        let mut config = ClientConfig::new(api_key)
            .with_base_url(self.base_url)
            .with_timeout(Duration::from_secs(self.timeout_secs));

        if let Some(workspace_id) = self.workspace_id.as_deref() {
            if !workspace_id.trim().is_empty() {
                validate_uuid(workspace_id.trim(), WORKSPACE_ID)?;
            }
            config = config.with_workspace(workspace_id);
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing to stderr (MCP uses stdio for protocol)
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = Args::parse().into_config().inspect_err(|e| {
        tracing::error!("{e}");
    })?;

    tracing::info!(
        base_url = %config.base_url,
        workspace = config.workspace_id.as_deref().unwrap_or("not set (accessing docs directly)"),
        "Starting molt-md MCP server"
    );

    let mcp = MoltMcp::new(config)?;

    // Create and serve the MCP server
    let service = mcp
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("MCP server error: {:?}", e);
        })?;

    tracing::info!("molt-mcp server ready");

    // Wait for the service to complete
    service.waiting().await?;

    tracing::info!("molt-mcp server shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WS: &str = "423e4567-e89b-12d3-a456-426614174000";

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("molt-mcp").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let args = Args {
            api_key: None,
            workspace_id: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        };
        let err = args.into_config().unwrap_err();
        assert!(err.to_string().contains("MOLT_API_KEY"));
    }

    #[test]
    fn test_blank_key_is_rejected() {
        let err = parse(&["--api-key", "   "]).into_config().unwrap_err();
        assert!(err.to_string().contains("MOLT_API_KEY"));
    }

    #[test]
    fn test_blank_workspace_means_none() {
        let config = parse(&["--api-key", "wk_test", "--workspace-id", "  "])
            .into_config()
            .unwrap();
        assert_eq!(config.workspace_id, None);
        assert_eq!(config.api_key, "wk_test");
    }

    #[test]
    fn test_valid_workspace_is_kept() {
        let config = parse(&["--api-key", "wk_test", "--workspace-id", WS, "--timeout-secs", "5"])
            .into_config()
            .unwrap();
        assert_eq!(config.workspace_id.as_deref(), Some(WS));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_malformed_workspace_refuses_to_start() {
        let err = parse(&["--api-key", "wk_test", "--workspace-id", "not-a-uuid"])
            .into_config()
            .unwrap_err();
        assert!(err.to_string().contains("not a valid UUID"));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let parsed = Args::try_parse_from(["molt-mcp", "--api-key", "wk_test", "--timeout-secs", "0"]);
        assert!(parsed.is_err());
    }
}
