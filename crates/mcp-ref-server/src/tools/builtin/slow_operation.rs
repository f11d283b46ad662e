//! `slow_operation` conformance fixture for the progress-reporter scenario
//! (spec.md §8 scenario 2).

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tokio::time::Duration;

use crate::error::ToolExecutionError;
use crate::tools::{McpTool, ProgressReporter, ToolAnnotations, ToolContext, ToolResult};

/// How often the handler checks in and reports progress. Finer than any
/// sane throttle window so the reporter's coalescing is actually exercised.
const TICK: Duration = Duration::from_millis(10);

pub struct SlowOperationTool;

#[async_trait::async_trait]
impl McpTool for SlowOperationTool {
    fn name(&self) -> &str {
        "slow_operation"
    }

    fn description(&self) -> &str {
        "Sleeps for the requested duration, reporting progress along the way."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "duration_ms": {"type": "integer", "minimum": 0}
            },
            "required": ["duration_ms"]
        })
    }

    fn annotations(&self) -> ToolAnnotations {
        ToolAnnotations {
            read_only_hint: Some(true),
            idempotent_hint: Some(true),
            ..Default::default()
        }
    }

    async fn execute(
        &self,
        _ctx: &ToolContext,
        arguments: Value,
        progress: Option<Arc<ProgressReporter>>,
    ) -> Result<ToolResult, ToolExecutionError> {
        let requested_duration_ms = arguments
            .get("duration_ms")
            .and_then(Value::as_u64)
            .ok_or_else(|| ToolExecutionError::Validation("missing 'duration_ms'".to_string()))?;

        let start = Instant::now();
        let target = Duration::from_millis(requested_duration_ms);

        loop {
            let elapsed = start.elapsed();
            if elapsed >= target {
                break;
            }
            if let Some(reporter) = &progress {
                let pct = (elapsed.as_millis() as f64 / target.as_millis().max(1) as f64) * 100.0;
                reporter.report(pct, Some(100.0), None);
            }
            tokio::time::sleep(TICK.min(target - elapsed)).await;
        }

        let actual_duration_ms = start.elapsed().as_millis() as u64;
        let payload = serde_json::json!({
            "requested_duration_ms": requested_duration_ms,
            "actual_duration_ms": actual_duration_ms,
        });
        Ok(ToolResult::text(payload.to_string()))
    }
}
