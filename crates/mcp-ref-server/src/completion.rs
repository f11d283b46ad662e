//! Completion handler: argument-value suggestions for `completion/complete`
//! (spec.md §4.6).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::protocol::COMPLETION_CAP;

/// A reference to the thing being completed, per the `ref.type` tag.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionRef {
    #[serde(rename = "type")]
    pub ref_type: String,
    pub name: String,
}

/// The argument whose value is being completed.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionArgument {
    pub name: String,
    pub value: String,
}

/// Result returned by a *full* provider, or synthesized from a *simple*
/// provider's plain string list.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionResult {
    pub values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(rename = "hasMore", skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

impl CompletionResult {
    #[must_use]
    pub fn empty() -> Self {
        Self { values: Vec::new(), total: None, has_more: None }
    }

    /// Cap `values` at [`COMPLETION_CAP`], filling in `total`/`hasMore` iff
    /// the uncapped set was larger.
    #[must_use]
    fn capped(values: Vec<String>) -> Self {
        let total = values.len();
        if total > COMPLETION_CAP {
            Self {
                values: values.into_iter().take(COMPLETION_CAP).collect(),
                total: Some(total),
                has_more: Some(true),
            }
        } else {
            Self { values, total: None, has_more: None }
        }
    }
}

/// A provider keyed by `(toolName, argumentName)` returning a plain
/// candidate list; the handler applies prefix filtering and capping.
#[async_trait]
pub trait SimpleCompletionProvider: Send + Sync {
    async fn candidates(&self) -> Vec<String>;
}

/// A provider keyed by `(refType, name)` returning a fully-formed result,
/// unmodified by the handler.
#[async_trait]
pub trait FullCompletionProvider: Send + Sync {
    async fn complete(&self, argument: &CompletionArgument) -> CompletionResult;
}

/// Registry and dispatcher for `completion/complete` (spec.md §4.6).
#[derive(Default)]
pub struct CompletionHandler {
    simple: HashMap<(String, String), Arc<dyn SimpleCompletionProvider>>,
    full: HashMap<(String, String), Arc<dyn FullCompletionProvider>>,
}

impl CompletionHandler {
    #[must_use]
    pub fn new() -> Self {
        Self { simple: HashMap::new(), full: HashMap::new() }
    }

    pub fn register_simple(
        &mut self,
        tool_name: impl Into<String>,
        argument_name: impl Into<String>,
        provider: Arc<dyn SimpleCompletionProvider>,
    ) {
        self.simple.insert((tool_name.into(), argument_name.into()), provider);
    }

    pub fn register_full(
        &mut self,
        ref_type: impl Into<String>,
        name: impl Into<String>,
        provider: Arc<dyn FullCompletionProvider>,
    ) {
        self.full.insert((ref_type.into(), name.into()), provider);
    }

    /// Dispatch per spec.md §4.6: simple provider (for `ref/tool`) takes
    /// priority, then a full provider, then an empty result.
    pub async fn complete(&self, reference: &CompletionRef, argument: &CompletionArgument) -> CompletionResult {
        if reference.ref_type == "ref/tool" {
            if let Some(provider) = self.simple.get(&(reference.name.clone(), argument.name.clone())) {
                let candidates = provider.candidates().await;
                let prefix = argument.value.to_lowercase();
                let filtered: Vec<String> =
                    candidates.into_iter().filter(|c| c.to_lowercase().starts_with(&prefix)).collect();
                return CompletionResult::capped(filtered);
            }
        }

        if let Some(provider) = self.full.get(&(reference.ref_type.clone(), reference.name.clone())) {
            return provider.complete(argument).await;
        }

        CompletionResult::empty()
    }
}
