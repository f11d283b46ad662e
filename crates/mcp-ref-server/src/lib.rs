//! Reference Model Context Protocol (MCP) server.
//!
//! Exposes tools, completions, and logging to connected clients over stdio
//! (single connection) or HTTP with Server-Sent-Events (multi-session).
//!
//! # Subsystems
//!
//! - [`protocol`]: JSON-RPC framing, lifecycle state machine, capability
//!   negotiation, pagination, and the message router.
//! - [`session`]: long-lived duplex session state and resumable SSE streams.
//! - [`tools`]: validated tool dispatch with timeouts, cancellation, and
//!   throttled progress notifications.
//! - [`oauth`]: PKCE, single-use authorization codes, refresh tokens, and
//!   RFC 8414 / RFC 9728 discovery.
//!
//! # Example
//!
//! ```no_run
//! use mcp_ref_server::{config::Config, server::McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let server = McpServer::new(config);
//!     server.run_stdio().await
//! }
//! ```

pub mod cancellation;
pub mod completion;
pub mod config;
pub mod error;
pub mod logging;
pub mod oauth;
pub mod protocol;
pub mod server;
pub mod session;
pub mod shutdown;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::{ProtocolError, ToolExecutionError};
pub use server::McpServer;
