//! In-memory, process-local OAuth state store (spec.md §4.12).
//!
//! Explicitly non-production (spec.md §9): a persistent reimplementation
//! must preserve the single-use-on-attempt contract for authorization
//! codes, which prevents replay even when an exchange partially fails.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::RngCore;
use tokio::sync::RwLock;

use super::types::{AccessToken, AuthCodeInfo, AuthorizationCode, ClientInfo, OAuthClient, RefreshToken, TokenPair};
use crate::config::protocol::{AUTH_CODE_LIFETIME, OAUTH_SWEEP_INTERVAL};

const ACCESS_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);
const REFRESH_TOKEN_LIFETIME: Duration = Duration::from_secs(30 * 24 * 3600);

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Holds clients, authorization codes, access tokens, and refresh tokens
/// behind a single lock per map (spec.md §5: "OAuth store holds a single
/// lock across its two maps", generalized here to four, same policy).
pub struct OAuthStore {
    clients: RwLock<HashMap<String, OAuthClient>>,
    auth_codes: RwLock<HashMap<String, AuthorizationCode>>,
    access_tokens: RwLock<HashMap<String, AccessToken>>,
    refresh_tokens: RwLock<HashMap<String, RefreshToken>>,
}

impl OAuthStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
            auth_codes: RwLock::new(HashMap::new()),
            access_tokens: RwLock::new(HashMap::new()),
            refresh_tokens: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register_client(&self, client_name: Option<String>, redirect_uris: Vec<String>) -> OAuthClient {
        let client_id = generate_token();
        let client =
            OAuthClient { client_id: client_id.clone(), client_name, redirect_uris, created_at: Instant::now() };
        self.clients.write().await.insert(client_id, client.clone());
        client
    }

    pub async fn get_client(&self, client_id: &str) -> Option<ClientInfo> {
        self.clients.read().await.get(client_id).map(|c| ClientInfo {
            client_id: c.client_id.clone(),
            client_name: c.client_name.clone(),
            redirect_uris: c.redirect_uris.clone(),
        })
    }

    /// Issue a freshly generated 256-bit authorization code bound to the
    /// given request parameters, with a fixed TTL.
    #[allow(clippy::too_many_arguments)]
    pub async fn store_authorization_code(
        &self,
        client_id: String,
        redirect_uri: String,
        code_challenge: String,
        code_challenge_method: String,
        subject: String,
        scope: String,
        state: Option<String>,
    ) -> String {
        let code = generate_token();
        let now = Instant::now();
        self.auth_codes.write().await.insert(
            code.clone(),
            AuthorizationCode {
                client_id,
                redirect_uri,
                code_challenge,
                code_challenge_method,
                subject,
                scope,
                state,
                created_at: now,
                expires_at: now + AUTH_CODE_LIFETIME,
            },
        );
        code
    }

    /// Single-use-on-attempt: the entry is deleted on the first lookup
    /// regardless of whether it turns out to be valid, expired, or the
    /// caller later fails PKCE verification. This is what prevents replay
    /// even on a partially-failed exchange (spec.md §9).
    pub async fn consume_authorization_code(&self, code: &str) -> Option<AuthCodeInfo> {
        let entry = self.auth_codes.write().await.remove(code)?;
        if entry.is_expired() {
            return None;
        }
        Some(AuthCodeInfo {
            client_id: entry.client_id,
            redirect_uri: entry.redirect_uri,
            code_challenge: entry.code_challenge,
            code_challenge_method: entry.code_challenge_method,
            subject: entry.subject,
            scope: entry.scope,
        })
    }

    pub async fn create_token_pair(&self, client_id: &str, subject: &str, scope: &str) -> TokenPair {
        let access = generate_token();
        let refresh = generate_token();
        let now = Instant::now();

        self.access_tokens.write().await.insert(
            access.clone(),
            AccessToken {
                client_id: client_id.to_owned(),
                subject: subject.to_owned(),
                scope: scope.to_owned(),
                created_at: now,
                expires_in: ACCESS_TOKEN_LIFETIME,
            },
        );
        self.refresh_tokens.write().await.insert(
            refresh.clone(),
            RefreshToken {
                client_id: client_id.to_owned(),
                subject: subject.to_owned(),
                scope: scope.to_owned(),
                access_token: access.clone(),
                created_at: now,
                expires_at: now + REFRESH_TOKEN_LIFETIME,
            },
        );

        TokenPair {
            access_token: access,
            refresh_token: refresh,
            expires_in: ACCESS_TOKEN_LIFETIME.as_secs(),
            scope: scope.to_owned(),
        }
    }

    /// Validate an access token, lazily evicting it if expired. Returns
    /// the client and subject on success.
    pub async fn validate_access_token(&self, token: &str) -> Option<(String, String)> {
        let mut tokens = self.access_tokens.write().await;
        let access = tokens.get(token)?;
        if access.is_expired() {
            tokens.remove(token);
            return None;
        }
        Some((access.client_id.clone(), access.subject.clone()))
    }

    /// Mint a new access token against an existing refresh token. The
    /// refresh token itself is left in the store so it can be used again;
    /// only explicit revocation or TTL expiry invalidates it (spec.md §3).
    pub async fn refresh_token_pair(&self, refresh_token: &str) -> Option<TokenPair> {
        let (client_id, subject, scope, old_access_token) = {
            let tokens = self.refresh_tokens.read().await;
            let entry = tokens.get(refresh_token)?;
            if entry.is_expired() {
                return None;
            }
            (entry.client_id.clone(), entry.subject.clone(), entry.scope.clone(), entry.access_token.clone())
        };

        self.access_tokens.write().await.remove(&old_access_token);

        let access = generate_token();
        let now = Instant::now();
        self.access_tokens.write().await.insert(
            access.clone(),
            AccessToken { client_id, subject, scope: scope.clone(), created_at: now, expires_in: ACCESS_TOKEN_LIFETIME },
        );

        if let Some(entry) = self.refresh_tokens.write().await.get_mut(refresh_token) {
            entry.access_token = access.clone();
        }

        Some(TokenPair {
            access_token: access,
            refresh_token: refresh_token.to_string(),
            expires_in: ACCESS_TOKEN_LIFETIME.as_secs(),
            scope,
        })
    }

    pub async fn revoke_refresh_token(&self, refresh_token: &str) {
        self.refresh_tokens.write().await.remove(refresh_token);
    }

    /// Purge every expired authorization code, access token, and refresh
    /// token. Runs every [`OAUTH_SWEEP_INTERVAL`].
    async fn sweep_expired(&self) {
        self.auth_codes.write().await.retain(|_, c| !c.is_expired());
        self.access_tokens.write().await.retain(|_, t| !t.is_expired());
        self.refresh_tokens.write().await.retain(|_, t| !t.is_expired());
    }

    pub fn start_sweeper(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(OAUTH_SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                self.sweep_expired().await;
            }
        });
    }
}

impl Default for OAuthStore {
    fn default() -> Self {
        Self::new()
    }
}
