//! `tools/call` end to end through the router, covering the
//! resolve → validate → progress → result pipeline (spec.md §4.4, §8
//! scenario 2 and 3).

mod support;

use mcp_ref_server::config::Config;
use mcp_ref_server::server::McpServer;
use mcp_ref_server::session::Session;
use support::{collecting_sink, initialize, request};

#[tokio::test]
async fn test_roll_dice_happy_path() {
    let server = McpServer::new(Config::for_testing());
    let session = Session::for_testing();
    let (outbound, _) = collecting_sink();
    initialize(&server.router, &session, outbound.clone()).await;

    let call = request(
        2,
        "tools/call",
        serde_json::json!({"name": "roll_dice", "arguments": {"notation": "2d6+1"}}),
    );
    let response = server.router.route(&session, call, outbound).await.unwrap();
    let result = response.result.unwrap();
    assert_eq!(result["isError"], false);
}

#[tokio::test]
async fn test_unknown_tool_is_method_not_found() {
    let server = McpServer::new(Config::for_testing());
    let session = Session::for_testing();
    let (outbound, _) = collecting_sink();
    initialize(&server.router, &session, outbound.clone()).await;

    let call = request(2, "tools/call", serde_json::json!({"name": "does_not_exist", "arguments": {}}));
    let response = server.router.route(&session, call, outbound).await.unwrap();
    let error = response.error.unwrap();
    assert_eq!(error.code, mcp_ref_server::protocol::jsonrpc::error_code::METHOD_NOT_FOUND);
}

#[tokio::test]
async fn test_schema_violation_is_a_tool_level_error_not_a_protocol_error() {
    let server = McpServer::new(Config::for_testing());
    let session = Session::for_testing();
    let (outbound, _) = collecting_sink();
    initialize(&server.router, &session, outbound.clone()).await;

    // roll_dice requires `notation`.
    let call = request(2, "tools/call", serde_json::json!({"name": "roll_dice", "arguments": {}}));
    let response = server.router.route(&session, call, outbound).await.unwrap();
    let result = response.result.expect("schema violations are tool-level, not protocol errors");
    assert_eq!(result["isError"], true);
}

#[tokio::test]
async fn test_slow_operation_reports_progress_through_outbound_sink() {
    let server = McpServer::new(Config::for_testing());
    let session = Session::for_testing();
    let (outbound, collected) = collecting_sink();
    initialize(&server.router, &session, outbound.clone()).await;

    let call = request(
        2,
        "tools/call",
        serde_json::json!({
            "name": "slow_operation",
            "arguments": {"duration_ms": 30},
            "_meta": {"progressToken": "tok-1"},
        }),
    );
    let response = server.router.route(&session, call, outbound).await.unwrap();
    assert_eq!(response.result.unwrap()["isError"], false);

    let frames = collected.lock().unwrap();
    assert!(!frames.is_empty(), "expected at least one progress notification");
    for frame in frames.iter() {
        assert_eq!(frame["method"], "notifications/progress");
        assert_eq!(frame["params"]["progressToken"], "tok-1");
    }
}

#[tokio::test]
async fn test_fortune_teller_returns_one_of_the_known_fortunes() {
    let server = McpServer::new(Config::for_testing());
    let session = Session::for_testing();
    let (outbound, _) = collecting_sink();
    initialize(&server.router, &session, outbound.clone()).await;

    let call = request(2, "tools/call", serde_json::json!({"name": "fortune_teller", "arguments": {}}));
    let response = server.router.route(&session, call, outbound).await.unwrap();
    let result = response.result.unwrap();
    assert_eq!(result["isError"], false);
    assert!(!result["content"][0]["text"].as_str().unwrap().is_empty());
}
