//! JSON-RPC 2.0 codec: message types, error-code table, and builders.
//!
//! Grounded in the teacher's `server::transport::JsonRpcRequest` /
//! `JsonRpcResponse` pair, generalized with the full MCP-reserved error
//! range and the request/notification predicates spec.md §4.1 calls for.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// The frozen JSON-RPC / MCP error-code table (spec.md §4.1, §7).
pub mod error_code {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    /// MCP-reserved: server not initialized.
    pub const NOT_INITIALIZED: i64 = -32002;

    /// Start of the reserved server-defined error range (-32000..=-32099).
    pub const SERVER_ERROR_RANGE_START: i64 = -32000;
    /// End of the reserved server-defined error range (-32000..=-32099).
    pub const SERVER_ERROR_RANGE_END: i64 = -32099;
}

/// A JSON-RPC request id: either a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
}

/// An inbound JSON-RPC 2.0 frame (request or notification).
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub id: Option<RequestId>,
}

impl JsonRpcRequest {
    /// A *request* carries an id and expects a response.
    #[must_use]
    pub fn is_request(&self) -> bool {
        self.id.is_some()
    }

    /// A *notification* carries no id and never produces a response.
    #[must_use]
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// `true` iff the frame declares the required `"jsonrpc":"2.0"` tag.
    #[must_use]
    pub fn is_valid_version(&self) -> bool {
        self.jsonrpc == "2.0"
    }
}

/// An outbound JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<RequestId>,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    const VERSION: &'static str = "2.0";

    /// Build a `response-success`.
    #[must_use]
    pub fn success(id: Option<RequestId>, result: serde_json::Value) -> Self {
        Self { jsonrpc: Cow::Borrowed(Self::VERSION), result: Some(result), error: None, id }
    }

    /// Build a `response-error` with no structured `data`.
    #[must_use]
    pub fn error(id: Option<RequestId>, code: i64, message: impl Into<String>) -> Self {
        Self::error_with_data(id, code, message, None)
    }

    /// Build a `response-error` with structured `data` (e.g. validation
    /// violations for invalid-params, or the missing tool name for
    /// method-not-found).
    #[must_use]
    pub fn error_with_data(
        id: Option<RequestId>,
        code: i64,
        message: impl Into<String>,
        data: Option<serde_json::Value>,
    ) -> Self {
        Self {
            jsonrpc: Cow::Borrowed(Self::VERSION),
            result: None,
            error: Some(JsonRpcError { code, message: message.into(), data }),
            id,
        }
    }

    /// Build the standard method-not-found response.
    #[must_use]
    pub fn method_not_found(id: Option<RequestId>, method: &str) -> Self {
        Self::error(id, error_code::METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    /// Build a notification (a frame with no `id` and thus no response
    /// slot, used when constructing outbound `notifications/*` frames).
    #[must_use]
    pub fn notification(method: &str, params: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "jsonrpc": Self::VERSION,
            "method": method,
            "params": params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_notification_predicates() {
        let req: JsonRpcRequest = serde_json::from_value(serde_json::json!({
            "jsonrpc": "2.0", "method": "ping", "id": 1
        }))
        .unwrap();
        assert!(req.is_request());
        assert!(!req.is_notification());

        let notif: JsonRpcRequest = serde_json::from_value(serde_json::json!({
            "jsonrpc": "2.0", "method": "notifications/initialized"
        }))
        .unwrap();
        assert!(notif.is_notification());
        assert!(!notif.is_request());
    }

    #[test]
    fn test_rejects_missing_version_tag() {
        let req: JsonRpcRequest = serde_json::from_value(serde_json::json!({
            "method": "ping", "id": 1
        }))
        .unwrap();
        assert!(!req.is_valid_version());
    }

    #[test]
    fn test_roundtrip_request_encode_decode() {
        let original = serde_json::json!({
            "jsonrpc": "2.0", "method": "tools/call", "id": "abc",
            "params": {"name": "roll_dice"}
        });
        let req: JsonRpcRequest = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(req.method, "tools/call");
        assert_eq!(req.id, Some(RequestId::String("abc".to_string())));
    }

    #[test]
    fn test_error_code_table() {
        assert_eq!(error_code::PARSE_ERROR, -32700);
        assert_eq!(error_code::NOT_INITIALIZED, -32002);
        assert!(error_code::SERVER_ERROR_RANGE_START <= error_code::SERVER_ERROR_RANGE_END);
    }

    #[test]
    fn test_method_not_found_builder() {
        let resp = JsonRpcResponse::method_not_found(Some(RequestId::Number(1)), "bogus");
        let err = resp.error.unwrap();
        assert_eq!(err.code, error_code::METHOD_NOT_FOUND);
        assert!(err.message.contains("bogus"));
    }
}
