//! Fuzzing library for mcp-ref-server.
//!
//! Re-exports the adversarial-input parsing surfaces targeted by the
//! fuzz binaries under `fuzz/fuzz_targets/`: JSON-RPC framing, pagination
//! cursors, and PKCE challenge verification.
//!
//! # Usage
//!
//! ```bash
//! cd crates/protocol-fuzz
//! cargo +nightly fuzz run fuzz_jsonrpc_parse -- -max_total_time=60
//! ```

pub use mcp_ref_server::oauth::pkce;
pub use mcp_ref_server::protocol::{jsonrpc, pagination};
