//! `fortune_teller` conformance fixture.

use std::sync::Arc;

use rand::Rng;
use serde_json::Value;

use crate::error::ToolExecutionError;
use crate::tools::{McpTool, ProgressReporter, ToolAnnotations, ToolContext, ToolResult};

const FORTUNES: &[&str] = &[
    "A surprising opportunity is closer than you think.",
    "The code you fear to touch holds the answer you need.",
    "Patience will resolve the race condition in your plans.",
    "An old dependency returns, wiser than before.",
    "Today's bug is tomorrow's regression test.",
];

pub struct FortuneTellerTool;

#[async_trait::async_trait]
impl McpTool for FortuneTellerTool {
    fn name(&self) -> &str {
        "fortune_teller"
    }

    fn description(&self) -> &str {
        "Returns a random fortune-cookie-style message."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    fn annotations(&self) -> ToolAnnotations {
        ToolAnnotations {
            read_only_hint: Some(true),
            idempotent_hint: Some(false),
            ..Default::default()
        }
    }

    async fn execute(
        &self,
        _ctx: &ToolContext,
        _arguments: Value,
        _progress: Option<Arc<ProgressReporter>>,
    ) -> Result<ToolResult, ToolExecutionError> {
        let index = rand::thread_rng().gen_range(0..FORTUNES.len());
        Ok(ToolResult::text(FORTUNES[index]))
    }
}
