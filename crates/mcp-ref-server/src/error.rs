//! Error taxonomy for the MCP reference server.
//!
//! Three taxonomies operate side by side: [`ProtocolError`] (JSON-RPC
//! protocol-level failures), [`ToolExecutionError`] (tool-level failures,
//! always surfaced as a successful JSON-RPC response with `isError:true`),
//! and transport-level HTTP status codes handled directly in `transport::http`.

use crate::protocol::jsonrpc::error_code;

/// Errors that become a JSON-RPC `response-error` envelope.
#[derive(thiserror::Error, Debug)]
pub enum ProtocolError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Server not initialized")]
    NotInitialized,
}

impl ProtocolError {
    /// The JSON-RPC error code this variant maps to.
    #[must_use]
    pub const fn code(&self) -> i64 {
        match self {
            Self::Parse(_) => error_code::PARSE_ERROR,
            Self::InvalidRequest(_) => error_code::INVALID_REQUEST,
            Self::MethodNotFound(_) => error_code::METHOD_NOT_FOUND,
            Self::InvalidParams(_) => error_code::INVALID_PARAMS,
            Self::Internal(_) => error_code::INTERNAL_ERROR,
            Self::NotInitialized => error_code::NOT_INITIALIZED,
        }
    }
}

/// Errors from MCP tool execution.
///
/// Every variant here is reported through a *successful* JSON-RPC response
/// whose `result.isError` is `true` (it never becomes a [`ProtocolError`]).
#[derive(thiserror::Error, Debug)]
pub enum ToolExecutionError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Input validation failed: {0}")]
    Validation(String),

    #[error("Tool execution timeout")]
    Timeout,

    #[error("cancelled")]
    Cancelled,

    #[error("{0}")]
    Handler(String),
}

impl ToolExecutionError {
    /// The text surfaced to the model in the `ToolResult`'s content part.
    ///
    /// Never includes a stack trace or any internal detail beyond the
    /// handler's own message.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_codes() {
        assert_eq!(ProtocolError::Parse(String::new()).code(), -32700);
        assert_eq!(ProtocolError::InvalidRequest(String::new()).code(), -32600);
        assert_eq!(ProtocolError::MethodNotFound(String::new()).code(), -32601);
        assert_eq!(ProtocolError::InvalidParams(String::new()).code(), -32602);
        assert_eq!(ProtocolError::Internal(String::new()).code(), -32603);
        assert_eq!(ProtocolError::NotInitialized.code(), -32002);
    }

    #[test]
    fn test_tool_error_messages_carry_no_internals() {
        let err = ToolExecutionError::Handler("division by zero".to_string());
        assert_eq!(err.to_user_message(), "division by zero");
    }
}
