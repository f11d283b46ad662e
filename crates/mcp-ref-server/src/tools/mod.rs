//! Tool registry, execution pipeline, progress reporting, and built-in
//! conformance fixture tools (spec.md §4.4, §4.5).

pub mod builtin;
pub mod executor;
pub mod progress;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use executor::ToolExecutor;
pub use progress::{ProgressReporter, SendFn};

/// A single part of a tool result's content list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text { text: String },
    Image { data: String, #[serde(rename = "mimeType")] mime_type: String },
}

impl ContentPart {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// The structured result of a tool call (spec.md §3 `ToolResult`).
///
/// Errors carried here are *tool-level*: reported to the model, never as a
/// JSON-RPC protocol error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ContentPart>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolResult {
    #[must_use]
    pub fn success(content: Vec<ContentPart>) -> Self {
        Self { content, is_error: false }
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self { content: vec![ContentPart::text(text)], is_error: false }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { content: vec![ContentPart::text(message)], is_error: true }
    }
}

/// Hints about a tool's side effects. Advisory only, never contracts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolAnnotations {
    #[serde(rename = "readOnlyHint", skip_serializing_if = "Option::is_none")]
    pub read_only_hint: Option<bool>,
    #[serde(rename = "destructiveHint", skip_serializing_if = "Option::is_none")]
    pub destructive_hint: Option<bool>,
    #[serde(rename = "idempotentHint", skip_serializing_if = "Option::is_none")]
    pub idempotent_hint: Option<bool>,
    #[serde(rename = "openWorldHint", skip_serializing_if = "Option::is_none")]
    pub open_world_hint: Option<bool>,
}

/// Shared state available to every tool handler during execution.
#[derive(Clone, Default)]
pub struct ToolContext {
    pub session_id: String,
}

impl ToolContext {
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> Self {
        Self { session_id: session_id.into() }
    }
}

/// A registered, schema-described callable exposed to clients.
///
/// Immutable after registration: tools never mutate their own schema or
/// description once installed in a [`ToolRegistry`].
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    fn name(&self) -> &str;

    fn title(&self) -> Option<&str> {
        None
    }

    fn description(&self) -> &str;

    fn input_schema(&self) -> serde_json::Value;

    fn annotations(&self) -> ToolAnnotations {
        ToolAnnotations::default()
    }

    /// Per-tool timeout override; `None` defers to the executor default.
    fn timeout(&self) -> Option<std::time::Duration> {
        None
    }

    async fn execute(
        &self,
        ctx: &ToolContext,
        arguments: serde_json::Value,
        progress: Option<Arc<ProgressReporter>>,
    ) -> Result<ToolResult, crate::error::ToolExecutionError>;
}

/// Metadata shape returned from `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
    pub annotations: ToolAnnotations,
}

/// Insertion-ordered registry of tools, keyed by name.
///
/// Write-once at startup, read-mostly thereafter (spec.md §5).
pub struct ToolRegistry {
    order: Vec<String>,
    tools: BTreeMap<String, Arc<dyn McpTool>>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { order: Vec::new(), tools: BTreeMap::new() }
    }

    /// Register a tool. Returns `Err` if a tool with the same name already
    /// exists.
    pub fn register(&mut self, tool: Arc<dyn McpTool>) -> Result<(), String> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(format!("tool already registered: {name}"));
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn McpTool>> {
        self.tools.get(name).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All tools in registration order, converted to their wire-format
    /// metadata.
    #[must_use]
    pub fn list_info(&self) -> Vec<ToolInfo> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| ToolInfo {
                name: tool.name().to_string(),
                title: tool.title().map(str::to_string),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
                annotations: tool.annotations(),
            })
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
