//! Ties the protocol core, tool pipeline, sessions, and OAuth plane
//! together into a single server object, analogous to the teacher's
//! `server::McpServer`.

use std::sync::Arc;
use std::time::Duration;

use crate::cancellation::CancellationRegistry;
use crate::completion::CompletionHandler;
use crate::config::Config;
use crate::oauth::OAuthStore;
use crate::protocol::extensions::ExtensionRegistry;
use crate::protocol::router::MessageRouter;
use crate::session::SessionManager;
use crate::shutdown::ShutdownManager;
use crate::tools::builtin::{FortuneTellerTool, RollDiceTool, SlowOperationTool};
use crate::tools::{ToolExecutor, ToolRegistry};

/// Every long-lived subsystem a transport needs to serve requests.
///
/// Constructed once at startup and shared behind `Arc` across connections;
/// nothing here is mutated after [`McpServer::new`] returns except through
/// the interior mutability each subsystem already provides.
pub struct McpServer {
    pub config: Config,
    pub router: Arc<MessageRouter>,
    pub sessions: Arc<SessionManager>,
    pub cancellation: Arc<CancellationRegistry>,
    pub oauth: Arc<OAuthStore>,
    pub shutdown: Arc<ShutdownManager>,
}

impl McpServer {
    /// Build the server with the built-in conformance fixture tools
    /// registered (spec.md §1, §8 scenario 3). Real deployments add their
    /// own tools before `new` via [`ToolRegistry::register`] by
    /// constructing through [`McpServer::with_registry`] instead.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(RollDiceTool)).expect("built-in tool names don't collide");
        registry.register(Arc::new(FortuneTellerTool)).expect("built-in tool names don't collide");
        registry.register(Arc::new(SlowOperationTool)).expect("built-in tool names don't collide");
        Self::with_registry(config, registry)
    }

    /// Build the server from a caller-supplied registry, for embedders
    /// that want a different (or empty) tool surface than the built-in
    /// conformance fixtures.
    #[must_use]
    pub fn with_registry(config: Config, registry: ToolRegistry) -> Self {
        let registry = Arc::new(registry);
        let progress_throttle = config.progress_interval;
        let request_timeout = config.request_timeout;
        let cancellation = Arc::new(CancellationRegistry::new());
        let executor =
            Arc::new(ToolExecutor::new(registry.clone(), request_timeout, progress_throttle, cancellation.clone()));
        let completions = Arc::new(CompletionHandler::new());
        let extensions = Arc::new(ExtensionRegistry::new());

        let router = Arc::new(MessageRouter::new(registry, executor, completions, extensions));
        let sessions = Arc::new(SessionManager::new());
        let oauth = Arc::new(OAuthStore::new());
        let shutdown =
            Arc::new(ShutdownManager::new(cancellation.clone(), sessions.clone(), config.shutdown_timeout));

        Self { config, router, sessions, cancellation, oauth, shutdown }
    }

    /// Spawn the background sweepers (session idle reaper, OAuth TTL
    /// sweeper) and register the cleanup handlers the shutdown manager
    /// runs in reverse order: OAuth store first stops sweeping, then
    /// sessions stop sweeping, mirroring construction order reversed.
    pub fn start_background_tasks(&self) {
        self.sessions.clone().start_sweeper();
        self.oauth.clone().start_sweeper();
    }

    pub async fn run_stdio(self: Arc<Self>) -> anyhow::Result<()> {
        self.start_background_tasks();
        crate::transport::stdio::run(self).await
    }

    pub async fn run_http(self: Arc<Self>) -> anyhow::Result<()> {
        self.start_background_tasks();
        crate::transport::http::run(self).await
    }

    /// Minimum time the shutdown manager waits before escalating, for
    /// transports that need it to size their own accept-loop timeout.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.config.shutdown_timeout
    }
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer").field("transport", &self.config.transport).finish()
    }
}
