//! Validated tool dispatch: resolve, validate, progress, timeout, result
//! (spec.md §4.4).

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use super::{ProgressReporter, SendFn, ToolContext, ToolRegistry, ToolResult};
use crate::cancellation::CancellationRegistry;
use crate::error::{ProtocolError, ToolExecutionError};

/// Outcome of a `tools/call` dispatch.
///
/// `MethodError` maps to a JSON-RPC error response; `Result` always maps to
/// a JSON-RPC success response whose payload is the (possibly `isError`)
/// [`ToolResult`] (tool-level failures are never protocol errors).
pub enum Dispatch {
    MethodError(ProtocolError),
    Result(ToolResult),
}

/// Executes tool calls against a [`ToolRegistry`].
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    default_timeout: Duration,
    progress_throttle: Duration,
    cancellation: Arc<CancellationRegistry>,
}

impl ToolExecutor {
    #[must_use]
    pub fn new(
        registry: Arc<ToolRegistry>,
        default_timeout: Duration,
        progress_throttle: Duration,
        cancellation: Arc<CancellationRegistry>,
    ) -> Self {
        Self { registry, default_timeout, progress_throttle, cancellation }
    }

    /// Run the full `tools/call` pipeline.
    ///
    /// `progress_token`/`send_progress` are `None` unless the caller
    /// supplied `_meta.progressToken`.
    pub async fn call(
        &self,
        ctx: &ToolContext,
        name: &str,
        arguments: Value,
        progress_token: Option<Value>,
        send_progress: Option<SendFn>,
    ) -> Dispatch {
        let Some(tool) = self.registry.get(name) else {
            return Dispatch::MethodError(ProtocolError::MethodNotFound(name.to_string()));
        };

        if let Err(violations) = validate_against_schema(&tool.input_schema(), &arguments) {
            let message = format_validation_failure(&violations);
            return Dispatch::Result(ToolResult::error(message));
        }

        let reporter = match (progress_token, send_progress) {
            (Some(token), Some(send)) => {
                Some(Arc::new(ProgressReporter::new(token, send, self.progress_throttle)))
            }
            _ => None,
        };

        let timeout = tool.timeout().unwrap_or(self.default_timeout);
        let start = Instant::now();

        let token = self.cancellation.begin(&ctx.session_id).await;
        let outcome = tokio::select! {
            outcome = tokio::time::timeout(timeout, tool.execute(ctx, arguments, reporter.clone())) => {
                Some(outcome)
            }
            () = token.cancelled() => None,
        };
        self.cancellation.end(&ctx.session_id).await;

        if let Some(reporter) = &reporter {
            reporter.complete(None);
        }

        let result = match outcome {
            Some(Ok(Ok(result))) => result,
            Some(Ok(Err(err))) => ToolResult::error(err.to_user_message()),
            Some(Err(_elapsed)) => ToolResult::error(ToolExecutionError::Timeout.to_user_message()),
            None => ToolResult::error(ToolExecutionError::Cancelled.to_user_message()),
        };

        tracing::debug!(
            tool = name,
            duration_ms = start.elapsed().as_millis() as u64,
            is_error = result.is_error,
            "tool call completed"
        );

        Dispatch::Result(result)
    }
}

/// The first `N` validation issues, for an `isError:true` ToolResult's text
/// content (spec.md §4.4 step 2).
const MAX_REPORTED_VIOLATIONS: usize = 5;

fn validate_against_schema(schema: &Value, instance: &Value) -> Result<(), Vec<String>> {
    let compiled = match jsonschema::validator_for(schema) {
        Ok(v) => v,
        Err(e) => return Err(vec![format!("invalid tool schema: {e}")]),
    };

    let violations: Vec<String> = compiled.iter_errors(instance).map(|e| e.to_string()).collect();

    if violations.is_empty() { Ok(()) } else { Err(violations) }
}

fn format_validation_failure(violations: &[String]) -> String {
    let shown: Vec<&String> = violations.iter().take(MAX_REPORTED_VIOLATIONS).collect();
    let mut message = format!("Invalid arguments: {}", shown.iter().map(|s| s.as_str()).collect::<Vec<_>>().join("; "));
    if violations.len() > MAX_REPORTED_VIOLATIONS {
        message.push_str(&format!(" (+{} more)", violations.len() - MAX_REPORTED_VIOLATIONS));
    }
    message
}
