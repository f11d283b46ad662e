//! `tools/list` pagination through the router against a registry large
//! enough to span several pages (spec.md §4.10, §8 scenario 4).

mod support;

use std::sync::Arc;

use async_trait::async_trait;
use mcp_ref_server::config::Config;
use mcp_ref_server::error::ToolExecutionError;
use mcp_ref_server::server::McpServer;
use mcp_ref_server::session::Session;
use mcp_ref_server::tools::{McpTool, ProgressReporter, ToolContext, ToolRegistry, ToolResult};
use support::{collecting_sink, initialize, request};

struct NumberedTool(String);

#[async_trait]
impl McpTool for NumberedTool {
    fn name(&self) -> &str {
        &self.0
    }
    fn description(&self) -> &str {
        "a pagination fixture tool"
    }
    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }
    async fn execute(
        &self,
        _ctx: &ToolContext,
        _arguments: serde_json::Value,
        _progress: Option<Arc<ProgressReporter>>,
    ) -> Result<ToolResult, ToolExecutionError> {
        Ok(ToolResult::text("n/a"))
    }
}

fn server_with_n_tools(n: usize) -> McpServer {
    let mut registry = ToolRegistry::new();
    for i in 0..n {
        registry.register(Arc::new(NumberedTool(format!("tool_{i:04}")))).unwrap();
    }
    McpServer::with_registry(Config::for_testing(), registry)
}

#[tokio::test]
async fn test_first_page_defaults_to_fifty_items_with_next_cursor() {
    let server = server_with_n_tools(120);
    let session = Session::for_testing();
    let (outbound, _) = collecting_sink();
    initialize(&server.router, &session, outbound.clone()).await;

    let list = request(2, "tools/list", serde_json::Value::Null);
    let response = server.router.route(&session, list, outbound).await.unwrap();
    let result = response.result.unwrap();
    let tools = result["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 50);
    assert!(result["nextCursor"].is_string());
}

#[tokio::test]
async fn test_walking_every_cursor_covers_every_tool_exactly_once() {
    let server = server_with_n_tools(120);
    let session = Session::for_testing();
    let (outbound, _) = collecting_sink();
    initialize(&server.router, &session, outbound.clone()).await;

    let mut seen = std::collections::HashSet::new();
    let mut cursor: Option<String> = None;
    loop {
        let params = match &cursor {
            Some(c) => serde_json::json!({"cursor": c}),
            None => serde_json::Value::Null,
        };
        let list = request(2, "tools/list", params);
        let response = server.router.route(&session, list, outbound.clone()).await.unwrap();
        let result = response.result.unwrap();
        for tool in result["tools"].as_array().unwrap() {
            seen.insert(tool["name"].as_str().unwrap().to_string());
        }
        cursor = result["nextCursor"].as_str().map(str::to_string);
        if cursor.is_none() {
            break;
        }
    }
    assert_eq!(seen.len(), 120);
}

#[tokio::test]
async fn test_malformed_cursor_is_invalid_params() {
    let server = server_with_n_tools(10);
    let session = Session::for_testing();
    let (outbound, _) = collecting_sink();
    initialize(&server.router, &session, outbound.clone()).await;

    let list = request(2, "tools/list", serde_json::json!({"cursor": "not-a-valid-cursor!!"}));
    let response = server.router.route(&session, list, outbound).await.unwrap();
    let error = response.error.unwrap();
    assert_eq!(error.code, mcp_ref_server::protocol::jsonrpc::error_code::INVALID_PARAMS);
}

#[tokio::test]
async fn test_small_registry_fits_on_one_page_with_no_next_cursor() {
    let server = server_with_n_tools(3);
    let session = Session::for_testing();
    let (outbound, _) = collecting_sink();
    initialize(&server.router, &session, outbound.clone()).await;

    let list = request(2, "tools/list", serde_json::Value::Null);
    let response = server.router.route(&session, list, outbound).await.unwrap();
    let result = response.result.unwrap();
    assert_eq!(result["tools"].as_array().unwrap().len(), 3);
    assert!(result["nextCursor"].is_null());
}
