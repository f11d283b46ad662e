//! Lifecycle state machine and capability negotiation (spec.md §4.2).
//!
//! ```text
//! uninitialized --initialize/req--> initializing --initialized/notif--> initialized --shutdown--> shutdown
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::protocol::{LATEST_PROTOCOL_VERSION, SUPPORTED_PROTOCOL_VERSIONS};
use crate::error::ProtocolError;

/// The session's position in the lifecycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Initialized,
    Shutdown,
}

/// Client capabilities negotiated during `initialize`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientCapabilities {
    #[serde(default)]
    pub experimental: serde_json::Map<String, serde_json::Value>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// Tracks one session's lifecycle state and negotiated parameters.
///
/// Methods outside `initialize`/`ping` are gated by [`LifecycleManager::gate`]
/// until the session reaches [`LifecycleState::Initialized`].
#[derive(Debug)]
pub struct LifecycleManager {
    state: RwLock<LifecycleState>,
    protocol_version: RwLock<Option<String>>,
    client_capabilities: RwLock<Option<ClientCapabilities>>,
}

impl LifecycleManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LifecycleState::Uninitialized),
            protocol_version: RwLock::new(None),
            client_capabilities: RwLock::new(None),
        }
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    /// Gate an inbound method against the current lifecycle state.
    ///
    /// Returns `Err` if the method isn't allowed yet; `Ok(())` if routing
    /// should proceed.
    pub async fn gate(&self, method: &str) -> Result<(), ProtocolError> {
        let state = self.state().await;
        match state {
            LifecycleState::Uninitialized => {
                if method == "initialize" || method == "ping" {
                    Ok(())
                } else {
                    Err(ProtocolError::NotInitialized)
                }
            }
            LifecycleState::Initializing => {
                if method == "notifications/initialized" || method == "ping" {
                    Ok(())
                } else if method == "initialize" {
                    Err(ProtocolError::InvalidRequest(
                        "already initializing".to_string(),
                    ))
                } else {
                    Err(ProtocolError::NotInitialized)
                }
            }
            LifecycleState::Initialized => {
                if method == "initialize" {
                    Err(ProtocolError::InvalidRequest("already initialized".to_string()))
                } else {
                    Ok(())
                }
            }
            LifecycleState::Shutdown => {
                Err(ProtocolError::InvalidRequest("session is shutting down".to_string()))
            }
        }
    }

    /// Process an `initialize` request: negotiate protocol version and
    /// capabilities, transition to `initializing`.
    ///
    /// Returns the negotiated protocol version.
    pub async fn handle_initialize(
        &self,
        requested_version: &str,
        capabilities: ClientCapabilities,
    ) -> Result<String, ProtocolError> {
        {
            let mut state = self.state.write().await;
            if *state != LifecycleState::Uninitialized {
                return Err(ProtocolError::InvalidRequest("already initialized".to_string()));
            }
            *state = LifecycleState::Initializing;
        }

        let negotiated = if SUPPORTED_PROTOCOL_VERSIONS.contains(&requested_version) {
            requested_version.to_string()
        } else {
            LATEST_PROTOCOL_VERSION.to_string()
        };

        *self.protocol_version.write().await = Some(negotiated.clone());
        *self.client_capabilities.write().await = Some(capabilities);

        Ok(negotiated)
    }

    /// Process the `notifications/initialized` notification: transition to
    /// `initialized`.
    pub async fn handle_initialized(&self) {
        let mut state = self.state.write().await;
        if *state == LifecycleState::Initializing {
            *state = LifecycleState::Initialized;
        }
    }

    /// Transition to `shutdown`.
    pub async fn handle_shutdown(&self) {
        *self.state.write().await = LifecycleState::Shutdown;
    }

    pub async fn protocol_version(&self) -> Option<String> {
        self.protocol_version.read().await.clone()
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}
