//! Central message router (spec.md §4.14).
//!
//! Single entry point for every inbound JSON-RPC frame: lifecycle gate,
//! dispatch by method, schema-shaped param parsing, and a last-catch-all
//! that turns anything unexpected into an internal-error response rather
//! than letting it cross the session boundary.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::extensions::ExtensionRegistry;
use super::jsonrpc::{JsonRpcResponse, RequestId};
use super::lifecycle::ClientCapabilities;
use super::pagination;
use crate::completion::{CompletionArgument, CompletionHandler, CompletionRef};
use crate::config::protocol::DEFAULT_PAGE_SIZE;
use crate::error::ProtocolError;
use crate::session::Session;
use crate::tools::executor::Dispatch;
use crate::tools::{ToolContext, ToolExecutor, ToolRegistry};

/// Callback the transport provides for delivering a server-initiated
/// notification frame (`{"jsonrpc":"2.0","method":...,"params":...}`) to
/// the client out of band from the response being built.
pub type OutboundSink = Arc<dyn Fn(Value) + Send + Sync>;

/// Routes inbound frames against the shared, write-once registries and a
/// single session's lifecycle/logging state.
pub struct MessageRouter {
    tools: Arc<ToolRegistry>,
    executor: Arc<ToolExecutor>,
    completions: Arc<CompletionHandler>,
    extensions: Arc<ExtensionRegistry>,
}

impl MessageRouter {
    #[must_use]
    pub fn new(
        tools: Arc<ToolRegistry>,
        executor: Arc<ToolExecutor>,
        completions: Arc<CompletionHandler>,
        extensions: Arc<ExtensionRegistry>,
    ) -> Self {
        Self { tools, executor, completions, extensions }
    }

    /// Route one frame. Returns `None` for notifications (which never
    /// produce a response) and for requests whose lifecycle gate allows no
    /// response to be sent (there are none today, but the shape is kept
    /// symmetric with notification handling).
    pub async fn route(&self, session: &Session, request: super::jsonrpc::JsonRpcRequest, outbound: OutboundSink) -> Option<JsonRpcResponse> {
        let is_request = request.is_request();
        let id = request.id.clone();

        if !request.is_valid_version() {
            let err = ProtocolError::InvalidRequest(format!("unsupported jsonrpc version: {}", request.jsonrpc));
            return self.respond(id, is_request, &request.method, Err(err));
        }

        if let Err(err) = session.lifecycle.gate(&request.method).await {
            return self.respond(id, is_request, &request.method, Err(err));
        }

        let result = self.dispatch(session, &request.method, request.params, outbound).await;
        self.respond(id, is_request, &request.method, result)
    }

    /// Notifications never produce a response frame; errors raised while
    /// handling one are logged and swallowed rather than surfaced.
    fn respond(
        &self,
        id: Option<RequestId>,
        is_request: bool,
        method: &str,
        result: Result<Value, ProtocolError>,
    ) -> Option<JsonRpcResponse> {
        if !is_request {
            if let Err(err) = result {
                tracing::warn!(method, error = %err, "error handling notification, swallowed");
            }
            return None;
        }
        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(err) => JsonRpcResponse::error(id, err.code(), err.to_string()),
        })
    }

    async fn dispatch(
        &self,
        session: &Session,
        method: &str,
        params: Value,
        outbound: OutboundSink,
    ) -> Result<Value, ProtocolError> {
        match method {
            "initialize" => self.handle_initialize(session, params).await,
            "notifications/initialized" => {
                session.lifecycle.handle_initialized().await;
                Ok(Value::Null)
            }
            "tools/list" => self.handle_tools_list(params),
            "tools/call" => self.handle_tools_call(session, params, outbound).await,
            "completion/complete" => self.handle_completion(params).await,
            "logging/setLevel" => self.handle_set_level(session, params),
            "ping" => Ok(serde_json::json!({})),
            other => Err(ProtocolError::MethodNotFound(other.to_string())),
        }
    }

    async fn handle_initialize(&self, session: &Session, params: Value) -> Result<Value, ProtocolError> {
        #[derive(Deserialize)]
        struct InitializeParams {
            #[serde(rename = "protocolVersion")]
            protocol_version: String,
            #[serde(default)]
            capabilities: ClientCapabilities,
        }

        let parsed: InitializeParams = serde_json::from_value(params)
            .map_err(|e| ProtocolError::InvalidParams(format!("initialize: {e}")))?;

        let enabled = self.extensions.negotiate(&parsed.capabilities.experimental).await;
        session.set_enabled_extensions(enabled.clone()).await;

        let negotiated =
            session.lifecycle.handle_initialize(&parsed.protocol_version, parsed.capabilities).await?;

        let experimental: serde_json::Map<String, Value> =
            enabled.iter().map(|name| (name.clone(), serde_json::json!({}))).collect();

        Ok(serde_json::json!({
            "protocolVersion": negotiated,
            "capabilities": {
                "tools": {"listChanged": false},
                "completions": {},
                "logging": {},
                "experimental": experimental,
            },
            "serverInfo": {
                "name": "mcp-ref-server",
                "version": env!("CARGO_PKG_VERSION"),
            },
        }))
    }

    fn handle_tools_list(&self, params: Value) -> Result<Value, ProtocolError> {
        #[derive(Deserialize, Default)]
        struct ListParams {
            cursor: Option<String>,
        }
        let parsed: ListParams = if params.is_null() {
            ListParams::default()
        } else {
            serde_json::from_value(params).map_err(|e| ProtocolError::InvalidParams(format!("tools/list: {e}")))?
        };

        let items = self.tools.list_info();
        let page = pagination::paginate(&items, parsed.cursor.as_deref(), DEFAULT_PAGE_SIZE)
            .map_err(ProtocolError::InvalidParams)?;

        Ok(serde_json::json!({ "tools": page.items, "nextCursor": page.next_cursor }))
    }

    async fn handle_tools_call(
        &self,
        session: &Session,
        params: Value,
        outbound: OutboundSink,
    ) -> Result<Value, ProtocolError> {
        #[derive(Deserialize)]
        struct ToolCallMeta {
            #[serde(rename = "progressToken")]
            progress_token: Option<Value>,
        }
        #[derive(Deserialize)]
        struct ToolCallParams {
            name: String,
            #[serde(default)]
            arguments: Value,
            #[serde(default, rename = "_meta")]
            meta: Option<ToolCallMeta>,
        }

        let parsed: ToolCallParams =
            serde_json::from_value(params).map_err(|e| ProtocolError::InvalidParams(format!("tools/call: {e}")))?;

        let progress_token = parsed.meta.as_ref().and_then(|m| m.progress_token.clone());
        let send_progress: Option<crate::tools::SendFn> = progress_token.as_ref().map(|token| {
            let token = token.clone();
            let outbound = outbound.clone();
            Box::new(move |payload: Value| {
                outbound(JsonRpcResponse::notification(
                    "notifications/progress",
                    merge_progress_token(&token, payload),
                ));
            }) as crate::tools::SendFn
        });

        let ctx = ToolContext::new(session.id.clone());
        match self.executor.call(&ctx, &parsed.name, parsed.arguments, progress_token, send_progress).await {
            Dispatch::MethodError(err) => Err(err),
            Dispatch::Result(result) => {
                Ok(serde_json::to_value(result).expect("ToolResult always serializes"))
            }
        }
    }

    async fn handle_completion(&self, params: Value) -> Result<Value, ProtocolError> {
        #[derive(Deserialize)]
        struct CompleteParams {
            #[serde(rename = "ref")]
            reference: CompletionRef,
            argument: CompletionArgument,
        }
        let parsed: CompleteParams = serde_json::from_value(params)
            .map_err(|e| ProtocolError::InvalidParams(format!("completion/complete: {e}")))?;

        let result = self.completions.complete(&parsed.reference, &parsed.argument).await;
        Ok(serde_json::json!({ "completion": result }))
    }

    fn handle_set_level(&self, session: &Session, params: Value) -> Result<Value, ProtocolError> {
        #[derive(Deserialize)]
        struct SetLevelParams {
            level: String,
        }
        let parsed: SetLevelParams = serde_json::from_value(params)
            .map_err(|e| ProtocolError::InvalidParams(format!("logging/setLevel: {e}")))?;

        session.logging.set_level(&parsed.level).map_err(ProtocolError::InvalidParams)?;
        Ok(serde_json::json!({}))
    }
}

/// Fold `progressToken` into a handler-supplied progress payload
/// (`{progress, total, message}`) to build a `notifications/progress` frame.
fn merge_progress_token(token: &Value, mut payload: Value) -> Value {
    if let Some(obj) = payload.as_object_mut() {
        obj.insert("progressToken".to_string(), token.clone());
    }
    payload
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::tools::{ProgressReporter, ToolResult};

    struct PingTool;

    #[async_trait::async_trait]
    impl crate::tools::McpTool for PingTool {
        fn name(&self) -> &str {
            "pingtool"
        }
        fn description(&self) -> &str {
            "returns pong"
        }
        fn input_schema(&self) -> Value {
            serde_json::json!({"type": "object"})
        }
        async fn execute(
            &self,
            _ctx: &ToolContext,
            _arguments: Value,
            progress: Option<Arc<ProgressReporter>>,
        ) -> Result<ToolResult, crate::error::ToolExecutionError> {
            if let Some(p) = progress {
                p.report(1.0, Some(1.0), None);
            }
            Ok(ToolResult::text("pong"))
        }
    }

    fn router_with(tools: Vec<Arc<dyn crate::tools::McpTool>>) -> MessageRouter {
        let mut registry = ToolRegistry::new();
        for tool in tools {
            registry.register(tool).unwrap();
        }
        let registry = Arc::new(registry);
        let executor = Arc::new(ToolExecutor::new(
            registry.clone(),
            std::time::Duration::from_secs(5),
            std::time::Duration::from_millis(0),
            Arc::new(crate::cancellation::CancellationRegistry::new()),
        ));
        MessageRouter::new(registry, executor, Arc::new(CompletionHandler::new()), Arc::new(ExtensionRegistry::new()))
    }

    fn req(method: &str, params: Value, id: Option<i64>) -> super::super::jsonrpc::JsonRpcRequest {
        super::super::jsonrpc::JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: id.map(RequestId::Number),
        }
    }

    fn noop_outbound() -> OutboundSink {
        Arc::new(|_| {})
    }

    #[tokio::test]
    async fn test_method_before_initialize_is_not_initialized() {
        let router = router_with(vec![]);
        let session = Session::for_testing();
        let response =
            router.route(&session, req("tools/list", Value::Null, Some(1)), noop_outbound()).await.unwrap();
        assert_eq!(response.error.unwrap().code, -32002);
    }

    #[tokio::test]
    async fn test_initialize_then_tools_list_roundtrip() {
        let router = router_with(vec![Arc::new(PingTool)]);
        let session = Session::for_testing();

        let init_params = serde_json::json!({"protocolVersion": "2025-06-18", "capabilities": {}});
        let response = router.route(&session, req("initialize", init_params, Some(1)), noop_outbound()).await.unwrap();
        assert!(response.error.is_none());

        router.route(&session, req("notifications/initialized", Value::Null, None), noop_outbound()).await;

        let response =
            router.route(&session, req("tools/list", Value::Null, Some(2)), noop_outbound()).await.unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["tools"][0]["name"], "pingtool");
    }

    #[tokio::test]
    async fn test_unknown_method_is_method_not_found() {
        let router = router_with(vec![]);
        let session = Session::for_testing();
        session.lifecycle.handle_initialize("2025-06-18", ClientCapabilities::default()).await.unwrap();
        session.lifecycle.handle_initialized().await;

        let response =
            router.route(&session, req("bogus/method", Value::Null, Some(1)), noop_outbound()).await.unwrap();
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_non_2_0_version_is_rejected() {
        let router = router_with(vec![]);
        let session = Session::for_testing();
        let mut request = req("ping", Value::Null, Some(1));
        request.jsonrpc = "1.0".to_string();

        let response = router.route(&session, request, noop_outbound()).await.unwrap();
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn test_initialize_response_echoes_negotiated_experimental_capabilities() {
        let router = router_with(vec![]);
        let session = Session::for_testing();

        let init_params = serde_json::json!({"protocolVersion": "2025-06-18", "capabilities": {}});
        let response = router.route(&session, req("initialize", init_params, Some(1)), noop_outbound()).await.unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["capabilities"]["experimental"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_tools_call_progress_notification_carries_token() {
        let router = router_with(vec![Arc::new(PingTool)]);
        let session = Session::for_testing();
        session.lifecycle.handle_initialize("2025-06-18", ClientCapabilities::default()).await.unwrap();
        session.lifecycle.handle_initialized().await;

        let received = Arc::new(Mutex::new(Vec::new()));
        let recv = received.clone();
        let outbound: OutboundSink = Arc::new(move |frame| recv.lock().unwrap().push(frame));

        let params = serde_json::json!({
            "name": "pingtool",
            "arguments": {},
            "_meta": {"progressToken": "tok-1"},
        });
        let response = router.route(&session, req("tools/call", params, Some(1)), outbound).await.unwrap();
        assert!(response.error.is_none());

        let frames = received.lock().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["params"]["progressToken"], "tok-1");
    }

    #[tokio::test]
    async fn test_invalid_params_on_tools_call_missing_name() {
        let router = router_with(vec![]);
        let session = Session::for_testing();
        session.lifecycle.handle_initialize("2025-06-18", ClientCapabilities::default()).await.unwrap();
        session.lifecycle.handle_initialized().await;

        let response =
            router.route(&session, req("tools/call", serde_json::json!({}), Some(1)), noop_outbound()).await.unwrap();
        assert_eq!(response.error.unwrap().code, -32602);
    }
}
