//! End-to-end lifecycle gating through the full server composition
//! (spec.md §4.2, §8 scenario 1).

mod support;

use mcp_ref_server::config::Config;
use mcp_ref_server::server::McpServer;
use mcp_ref_server::session::Session;
use support::{collecting_sink, initialize, notification, request};

#[tokio::test]
async fn test_tools_call_before_initialize_is_rejected() {
    let server = McpServer::new(Config::for_testing());
    let session = Session::for_testing();
    let (outbound, _) = collecting_sink();

    let call = request(1, "tools/call", serde_json::json!({"name": "roll_dice", "arguments": {"notation": "1d6"}}));
    let response = server.router.route(&session, call, outbound).await.unwrap();

    let error = response.error.expect("expected a protocol error before initialize");
    assert_eq!(error.code, mcp_ref_server::protocol::jsonrpc::error_code::NOT_INITIALIZED);
}

#[tokio::test]
async fn test_ping_is_allowed_before_initialize() {
    let server = McpServer::new(Config::for_testing());
    let session = Session::for_testing();
    let (outbound, _) = collecting_sink();

    let ping = request(1, "ping", serde_json::Value::Null);
    let response = server.router.route(&session, ping, outbound).await.unwrap();
    assert!(response.error.is_none());
}

#[tokio::test]
async fn test_full_handshake_unlocks_gated_methods() {
    let server = McpServer::new(Config::for_testing());
    let session = Session::for_testing();
    let (outbound, _) = collecting_sink();

    let init_response = initialize(&server.router, &session, outbound.clone()).await;
    let result = init_response.result.expect("initialize should succeed");
    assert_eq!(result["protocolVersion"], "2025-06-18");
    assert_eq!(session.lifecycle.state().await, mcp_ref_server::protocol::LifecycleState::Initialized);

    let list = request(2, "tools/list", serde_json::Value::Null);
    let response = server.router.route(&session, list, outbound).await.unwrap();
    assert!(response.error.is_none());
}

#[tokio::test]
async fn test_second_initialize_is_rejected() {
    let server = McpServer::new(Config::for_testing());
    let session = Session::for_testing();
    let (outbound, _) = collecting_sink();

    initialize(&server.router, &session, outbound.clone()).await;

    let second = request(3, "initialize", serde_json::json!({"protocolVersion": "2025-06-18", "capabilities": {}}));
    let response = server.router.route(&session, second, outbound).await.unwrap();
    assert!(response.error.is_some());
}

#[tokio::test]
async fn test_unknown_method_is_method_not_found_once_initialized() {
    let server = McpServer::new(Config::for_testing());
    let session = Session::for_testing();
    let (outbound, _) = collecting_sink();

    initialize(&server.router, &session, outbound.clone()).await;

    let unknown = request(4, "not/a/real/method", serde_json::Value::Null);
    let response = server.router.route(&session, unknown, outbound).await.unwrap();
    let error = response.error.unwrap();
    assert_eq!(error.code, mcp_ref_server::protocol::jsonrpc::error_code::METHOD_NOT_FOUND);
}

#[tokio::test]
async fn test_notification_errors_are_swallowed_not_surfaced() {
    let server = McpServer::new(Config::for_testing());
    let session = Session::for_testing();
    let (outbound, _) = collecting_sink();

    // Before initialize, a notification hitting the lifecycle gate must
    // still produce no response frame, even though it would error as a
    // request.
    let notif = notification("tools/call", serde_json::json!({"name": "roll_dice", "arguments": {}}));
    let response = server.router.route(&session, notif, outbound).await;
    assert!(response.is_none());
}
