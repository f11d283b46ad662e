//! Reference MCP server entry point.
//!
//! No CLI parsing: every setting comes from `MCP_*` environment variables
//! via [`Config::from_env`].

use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use mcp_ref_server::config::{Config, TransportKind};
use mcp_ref_server::server::McpServer;

/// STDIO reserves stdout for protocol frames, so its logs go to stderr;
/// HTTP has no such constraint and logs to stdout.
fn init_tracing(log_level: &str, to_stderr: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if to_stderr {
        registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log_level, matches!(config.transport, TransportKind::Stdio));

    tracing::info!(version = env!("CARGO_PKG_VERSION"), transport = ?config.transport, "starting mcp-ref-server");

    let server = Arc::new(McpServer::new(config));

    match server.config.transport {
        TransportKind::Stdio => server.run_stdio().await?,
        TransportKind::Http => server.run_http().await?,
        TransportKind::Both => {
            let stdio_server = server.clone();
            let http_server = server.clone();
            let stdio_task = tokio::spawn(async move { stdio_server.run_stdio().await });
            let http_task = tokio::spawn(async move { http_server.run_http().await });
            let (stdio_result, http_result) = tokio::try_join!(stdio_task, http_task)?;
            stdio_result?;
            http_result?;
        }
    }

    Ok(())
}
