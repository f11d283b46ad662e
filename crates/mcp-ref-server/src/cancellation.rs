//! Session-keyed cancellation tokens for in-flight `tools/call` requests
//! (spec.md §4.9).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Registry of in-flight cancellation tokens, keyed by session id.
///
/// One token per session is sufficient for the single-outstanding-call
/// model the HTTP `/api/cancel` endpoint targets (spec.md §4.9); a session
/// issuing overlapping `tools/call`s gets a fresh token per call that
/// replaces the previous entry.
#[derive(Default)]
pub struct CancellationRegistry {
    tokens: RwLock<HashMap<String, CancellationToken>>,
}

impl CancellationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { tokens: RwLock::new(HashMap::new()) }
    }

    /// Register a fresh token for `session_id`, returning it so the caller
    /// can pass it through to the tool handler.
    pub async fn begin(&self, session_id: &str) -> CancellationToken {
        let token = CancellationToken::new();
        self.tokens.write().await.insert(session_id.to_string(), token.clone());
        token
    }

    /// Remove the token once the request completes, whether cancelled or
    /// not.
    pub async fn end(&self, session_id: &str) {
        self.tokens.write().await.remove(session_id);
    }

    /// `POST /api/cancel`: fire-and-forget. Cancelling an unknown or
    /// already-completed session returns `false`, never an error.
    pub async fn cancel(&self, session_id: &str) -> bool {
        match self.tokens.read().await.get(session_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}
