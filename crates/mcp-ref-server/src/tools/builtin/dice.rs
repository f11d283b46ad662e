//! `roll_dice` conformance fixture (spec.md §8 scenario 3).

use std::sync::Arc;

use rand::Rng;
use serde_json::Value;

use crate::error::ToolExecutionError;
use crate::tools::{McpTool, ProgressReporter, ToolAnnotations, ToolContext, ToolResult};

/// Dice sizes a standard polyhedral set supports. `1d7` is rejected because
/// 7 isn't among them.
const VALID_SIDES: &[u32] = &[4, 6, 8, 10, 12, 20, 100];

struct Notation {
    count: u32,
    sides: u32,
    modifier: i64,
}

fn parse_notation(notation: &str) -> Result<Notation, String> {
    let notation = notation.trim();
    let (dice_part, modifier) = match notation.split_once('+') {
        Some((d, m)) => (d, m.parse::<i64>().map_err(|_| "invalid modifier".to_string())?),
        None => match notation.split_once('-') {
            Some((d, m)) => (
                d,
                -m.parse::<i64>().map_err(|_| "invalid modifier".to_string())?,
            ),
            None => (notation, 0),
        },
    };

    let Some((count_str, sides_str)) = dice_part.split_once('d') else {
        return Err(format!("malformed dice notation: {notation}"));
    };
    let count: u32 = count_str.parse().map_err(|_| "invalid dice count".to_string())?;
    let sides: u32 = sides_str.parse().map_err(|_| "invalid dice sides".to_string())?;

    if count == 0 || count > 100 {
        return Err("dice count must be between 1 and 100".to_string());
    }
    if !VALID_SIDES.contains(&sides) {
        return Err(format!("invalid sides: d{sides} is not a standard die"));
    }

    Ok(Notation { count, sides, modifier })
}

pub struct RollDiceTool;

#[async_trait::async_trait]
impl McpTool for RollDiceTool {
    fn name(&self) -> &str {
        "roll_dice"
    }

    fn description(&self) -> &str {
        "Roll dice using standard notation, e.g. '3d6+2'."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "notation": {"type": "string"}
            },
            "required": ["notation"]
        })
    }

    fn annotations(&self) -> ToolAnnotations {
        ToolAnnotations { read_only_hint: Some(true), idempotent_hint: Some(false), ..Default::default() }
    }

    async fn execute(
        &self,
        _ctx: &ToolContext,
        arguments: Value,
        _progress: Option<Arc<ProgressReporter>>,
    ) -> Result<ToolResult, ToolExecutionError> {
        let notation = arguments
            .get("notation")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolExecutionError::Validation("missing 'notation'".to_string()))?;

        let parsed = match parse_notation(notation) {
            Ok(p) => p,
            Err(_) => return Ok(ToolResult::error(format!("invalid dice notation: {notation}"))),
        };

        let mut rng = rand::thread_rng();
        let rolls: Vec<u32> = (0..parsed.count).map(|_| rng.gen_range(1..=parsed.sides)).collect();
        let total: i64 = rolls.iter().map(|&r| i64::from(r)).sum::<i64>() + parsed.modifier;

        let payload = serde_json::json!({
            "notation": notation,
            "rolls": rolls,
            "modifier": parsed.modifier,
            "total": total,
        });
        Ok(ToolResult::text(payload.to_string()))
    }
}
