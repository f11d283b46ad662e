//! OAuth 2.1 domain types (spec.md §3).

use std::time::{Duration, Instant};

/// A dynamically registered OAuth client (RFC 7591).
#[derive(Debug, Clone)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_name: Option<String>,
    pub redirect_uris: Vec<String>,
    pub created_at: Instant,
}

/// A single-use authorization code (spec.md §3 `Authorization code`).
#[derive(Debug, Clone)]
pub struct AuthorizationCode {
    pub client_id: String,
    pub redirect_uri: String,
    pub code_challenge: String,
    pub code_challenge_method: String,
    pub subject: String,
    pub scope: String,
    pub state: Option<String>,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl AuthorizationCode {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// A bearer access token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub client_id: String,
    pub subject: String,
    pub scope: String,
    pub created_at: Instant,
    pub expires_in: Duration,
}

impl AccessToken {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.expires_in
    }
}

/// A multi-use refresh token (spec.md §3 `Refresh token`).
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub client_id: String,
    pub subject: String,
    pub scope: String,
    pub access_token: String,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl RefreshToken {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Subset of client info returned from lookups.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub client_id: String,
    pub client_name: Option<String>,
    pub redirect_uris: Vec<String>,
}

/// Subset of authorization-code info returned from a consume attempt.
#[derive(Debug, Clone)]
pub struct AuthCodeInfo {
    pub client_id: String,
    pub redirect_uri: String,
    pub code_challenge: String,
    pub code_challenge_method: String,
    pub subject: String,
    pub scope: String,
}

/// A freshly issued or refreshed access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub scope: String,
}
