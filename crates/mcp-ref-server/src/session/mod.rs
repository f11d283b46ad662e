//! Session manager: concurrent session map with an idle sweeper, each
//! session owning its own lifecycle state, SSE ring, and logging threshold
//! (spec.md §4.8, §3 `Session`).

pub mod sse;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::RngCore;
use tokio::sync::RwLock;

use crate::config::protocol::{DEFAULT_SSE_RING_CAPACITY, SESSION_IDLE_TIMEOUT, SESSION_SWEEP_INTERVAL};
use crate::logging::LoggingHandler;
use crate::protocol::LifecycleManager;
use sse::SseRing;

/// Generate an opaque, cryptographically random session id (≥128 bits).
fn generate_session_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// A single client's protocol lifetime.
pub struct Session {
    pub id: String,
    pub created_at: Instant,
    last_active: RwLock<Instant>,
    pub lifecycle: LifecycleManager,
    pub sse: SseRing,
    pub logging: LoggingHandler,
    enabled_extensions: RwLock<std::collections::HashSet<String>>,
}

impl Session {
    fn new(id: String, ring_capacity: usize) -> Self {
        Self {
            id,
            created_at: Instant::now(),
            last_active: RwLock::new(Instant::now()),
            lifecycle: LifecycleManager::new(),
            sse: SseRing::new(ring_capacity),
            logging: LoggingHandler::new(),
            enabled_extensions: RwLock::new(std::collections::HashSet::new()),
        }
    }

    /// A standalone session not tracked by any [`SessionManager`], for unit
    /// tests that only need lifecycle/logging/SSE state.
    #[must_use]
    pub fn for_testing() -> Self {
        Self::new(generate_session_id(), DEFAULT_SSE_RING_CAPACITY)
    }

    pub async fn touch(&self) {
        *self.last_active.write().await = Instant::now();
    }

    async fn idle_for(&self) -> Duration {
        self.last_active.read().await.elapsed()
    }

    pub async fn set_enabled_extensions(&self, extensions: std::collections::HashSet<String>) {
        *self.enabled_extensions.write().await = extensions;
    }

    pub async fn enabled_extensions(&self) -> std::collections::HashSet<String> {
        self.enabled_extensions.read().await.clone()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("id", &self.id).field("created_at", &self.created_at).finish()
    }
}

/// Concurrent map from session id to [`Session`], with a background
/// sweeper that removes sessions idle beyond [`SESSION_IDLE_TIMEOUT`].
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
    ring_capacity: usize,
    idle_timeout: Duration,
}

impl SessionManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ring_capacity: DEFAULT_SSE_RING_CAPACITY,
            idle_timeout: SESSION_IDLE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn for_testing() -> Self {
        Self { idle_timeout: Duration::from_millis(0), ..Self::new() }
    }

    /// Create a session, regenerating the id on the vanishingly unlikely
    /// chance of a collision.
    pub async fn create_session(&self) -> Arc<Session> {
        let mut sessions = self.sessions.write().await;
        let mut id = generate_session_id();
        while sessions.contains_key(&id) {
            id = generate_session_id();
        }
        let session = Arc::new(Session::new(id.clone(), self.ring_capacity));
        sessions.insert(id, session.clone());
        session
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Session>> {
        let session = self.sessions.read().await.get(id).cloned();
        if let Some(session) = &session {
            session.touch().await;
        }
        session
    }

    pub async fn get_or_create(&self, id: Option<&str>) -> Arc<Session> {
        if let Some(id) = id {
            if let Some(session) = self.get(id).await {
                return session;
            }
        }
        self.create_session().await
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Remove sessions idle beyond the configured timeout. Returns the
    /// number removed.
    pub async fn sweep_idle(&self) -> usize {
        let stale: Vec<String> = {
            let sessions = self.sessions.read().await;
            let mut stale = Vec::new();
            for (id, session) in sessions.iter() {
                if session.idle_for().await > self.idle_timeout {
                    stale.push(id.clone());
                }
            }
            stale
        };

        if stale.is_empty() {
            return 0;
        }

        let mut sessions = self.sessions.write().await;
        for id in &stale {
            sessions.remove(id);
        }
        stale.len()
    }

    /// Spawn the background idle-sweeper task.
    pub fn start_sweeper(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                let removed = self.sweep_idle().await;
                if removed > 0 {
                    tracing::debug!(count = removed, "swept idle sessions");
                }
            }
        });
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
