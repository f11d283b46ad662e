//! Shared request-building helpers for the integration tests in this
//! directory. Not a test binary itself (`tests/support/mod.rs` is only
//! reachable via `mod support;`).

use std::sync::Arc;

use mcp_ref_server::protocol::router::OutboundSink;
use mcp_ref_server::protocol::{JsonRpcRequest, JsonRpcResponse};

pub fn request(id: i64, method: &str, params: serde_json::Value) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: Some(mcp_ref_server::protocol::jsonrpc::RequestId::Number(id)),
    }
}

pub fn notification(method: &str, params: serde_json::Value) -> JsonRpcRequest {
    JsonRpcRequest { jsonrpc: "2.0".to_string(), method: method.to_string(), params, id: None }
}

/// An outbound sink that collects every frame it's handed, for tests that
/// want to assert on server-initiated notifications (progress, logging).
pub fn collecting_sink() -> (OutboundSink, Arc<std::sync::Mutex<Vec<serde_json::Value>>>) {
    let collected = Arc::new(std::sync::Mutex::new(Vec::new()));
    let recv = collected.clone();
    let sink: OutboundSink = Arc::new(move |frame| recv.lock().unwrap().push(frame));
    (sink, collected)
}

/// Drive a session through `initialize` + `notifications/initialized`
/// against the given router, leaving it ready for gated methods.
pub async fn initialize(
    router: &mcp_ref_server::protocol::MessageRouter,
    session: &mcp_ref_server::session::Session,
    outbound: OutboundSink,
) -> JsonRpcResponse {
    let init = request(1, "initialize", serde_json::json!({"protocolVersion": "2025-06-18", "capabilities": {}}));
    let response = router.route(session, init, outbound.clone()).await.expect("initialize produces a response");
    let initd = notification("notifications/initialized", serde_json::Value::Null);
    router.route(session, initd, outbound).await;
    response
}
