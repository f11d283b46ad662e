//! HTTP route handlers for the OAuth 2.1 authorization plane (spec.md
//! §4.11-§4.13), adapted from the teacher's single-password
//! `server::oauth::handlers` to a bearer-token-gated auto-approval flow.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::Deserialize;

use super::discovery::{authorization_server_metadata, protected_resource_metadata};
use super::login::render_authorize_page;
use super::pkce;
use super::store::OAuthStore;
use super::www_authenticate::BearerChallenge;

/// Shared state the OAuth routes need: the store plus the handful of
/// configured values discovery documents and the bearer gate depend on.
pub struct OAuthState {
    pub store: Arc<OAuthStore>,
    pub resource_url: String,
    pub auth_servers: Vec<String>,
    pub auth_token: Option<String>,
}

pub async fn handle_protected_resource(State(state): State<Arc<OAuthState>>) -> impl IntoResponse {
    let servers = if state.auth_servers.is_empty() { vec![state.resource_url.clone()] } else { state.auth_servers.clone() };
    Json(protected_resource_metadata(&state.resource_url, servers))
}

pub async fn handle_auth_server_metadata(State(state): State<Arc<OAuthState>>) -> impl IntoResponse {
    Json(authorization_server_metadata(&state.resource_url))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub client_name: Option<String>,
    pub redirect_uris: Option<Vec<String>>,
}

pub async fn handle_register(State(state): State<Arc<OAuthState>>, Json(req): Json<RegisterRequest>) -> Response {
    let redirect_uris = req.redirect_uris.unwrap_or_default();
    if redirect_uris.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "invalid_request",
                "error_description": "redirect_uris is required"
            })),
        )
            .into_response();
    }

    let client = state.store.register_client(req.client_name, redirect_uris).await;
    tracing::info!(client_id = %client.client_id, "registered OAuth client");

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "client_id": client.client_id,
            "client_name": client.client_name,
            "redirect_uris": client.redirect_uris,
            "grant_types": ["authorization_code", "refresh_token"],
            "response_types": ["code"],
            "token_endpoint_auth_method": "none"
        })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub response_type: Option<String>,
    pub state: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
    pub scope: Option<String>,
}

/// `GET /authorize`: checks the shared-secret bearer token (`Authorization:
/// Bearer <MCP_AUTH_TOKEN>`) then renders the auto-approval page. Any
/// client that registered dynamically and presents valid PKCE parameters
/// gets an auto-approve form; there is no per-user identity beyond the
/// single configured token (spec.md §9, this server is not a production
/// identity provider).
pub async fn handle_authorize_get(
    State(state): State<Arc<OAuthState>>,
    headers: axum::http::HeaderMap,
    Query(query): Query<AuthorizeQuery>,
) -> Response {
    if let Some(challenge) = check_bearer(&state, &headers) {
        return challenge;
    }

    let Some(client_id) = query.client_id.as_deref() else {
        return bad_request("Missing client_id");
    };
    let Some(redirect_uri) = query.redirect_uri.as_deref() else {
        return bad_request("Missing redirect_uri");
    };
    let Some(code_challenge) = query.code_challenge.as_deref() else {
        return bad_request("Missing code_challenge");
    };
    if query.response_type.as_deref() != Some("code") {
        return bad_request("response_type must be 'code'");
    }
    let method = query.code_challenge_method.as_deref().unwrap_or("S256");
    if method != "S256" {
        return bad_request("code_challenge_method must be 'S256'");
    }

    let Some(client) = state.store.get_client(client_id).await else {
        return bad_request("Unknown client_id");
    };
    if !client.redirect_uris.iter().any(|u| u == redirect_uri) {
        return bad_request("redirect_uri not registered for this client");
    }

    let scope = query.scope.as_deref().unwrap_or("tools:read tools:execute");
    let html = render_authorize_page(
        client.client_name.as_deref().unwrap_or("unnamed client"),
        client_id,
        redirect_uri,
        query.state.as_deref().unwrap_or(""),
        code_challenge,
        method,
        scope,
    );
    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response()
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeForm {
    pub client_id: String,
    pub redirect_uri: String,
    pub state: Option<String>,
    pub code_challenge: String,
    pub code_challenge_method: String,
    pub scope: String,
}

/// `POST /authorize`: the auto-approval form submit. Issues the
/// authorization code and redirects back to the client's `redirect_uri`.
pub async fn handle_authorize_post(State(state): State<Arc<OAuthState>>, Form(form): Form<AuthorizeForm>) -> Response {
    let code = state
        .store
        .store_authorization_code(
            form.client_id.clone(),
            form.redirect_uri.clone(),
            form.code_challenge,
            form.code_challenge_method,
            "local-user".to_string(),
            form.scope,
            form.state.clone(),
        )
        .await;

    tracing::info!(client_id = %form.client_id, "auto-approved authorization");

    let mut redirect_url = form.redirect_uri;
    redirect_url.push_str(if redirect_url.contains('?') { "&" } else { "?" });
    redirect_url.push_str(&format!("code={code}"));
    if let Some(oauth_state) = form.state {
        redirect_url.push_str(&format!("&state={}", url_encode(&oauth_state)));
    }

    (StatusCode::FOUND, [(header::LOCATION, redirect_url)]).into_response()
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub grant_type: String,
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
    pub code_verifier: Option<String>,
    pub refresh_token: Option<String>,
}

pub async fn handle_token(State(state): State<Arc<OAuthState>>, Form(form): Form<TokenRequest>) -> Response {
    match form.grant_type.as_str() {
        "authorization_code" => handle_authorization_code_grant(&state.store, &form).await,
        "refresh_token" => handle_refresh_token_grant(&state.store, &form).await,
        _ => token_error("unsupported_grant_type", "grant_type must be authorization_code or refresh_token"),
    }
}

async fn handle_authorization_code_grant(store: &OAuthStore, form: &TokenRequest) -> Response {
    let Some(code) = form.code.as_deref() else {
        return token_error("invalid_request", "Missing code");
    };
    let Some(verifier) = form.code_verifier.as_deref() else {
        return token_error("invalid_request", "Missing code_verifier");
    };

    let Some(auth_code) = store.consume_authorization_code(code).await else {
        return token_error("invalid_grant", "Invalid or expired authorization code");
    };

    if let Some(redirect_uri) = &form.redirect_uri {
        if *redirect_uri != auth_code.redirect_uri {
            return token_error("invalid_grant", "redirect_uri mismatch");
        }
    }

    match pkce::verify_code_challenge(verifier, &auth_code.code_challenge, &auth_code.code_challenge_method) {
        Ok(true) => {}
        _ => return token_error("invalid_grant", "PKCE verification failed"),
    }

    let pair = store.create_token_pair(&auth_code.client_id, &auth_code.subject, &auth_code.scope).await;
    tracing::info!(client_id = %auth_code.client_id, "issued token pair");
    token_success(&pair)
}

async fn handle_refresh_token_grant(store: &OAuthStore, form: &TokenRequest) -> Response {
    let Some(refresh_token) = form.refresh_token.as_deref() else {
        return token_error("invalid_request", "Missing refresh_token");
    };
    let Some(pair) = store.refresh_token_pair(refresh_token).await else {
        return token_error("invalid_grant", "Invalid or expired refresh token");
    };
    token_success(&pair)
}

fn token_success(pair: &super::types::TokenPair) -> Response {
    let mut response = Json(serde_json::json!({
        "access_token": pair.access_token,
        "token_type": "Bearer",
        "expires_in": pair.expires_in,
        "refresh_token": pair.refresh_token,
        "scope": pair.scope,
    }))
    .into_response();
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}

fn token_error(error: &str, description: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": error, "error_description": description })))
        .into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, message.to_string()).into_response()
}

/// Validate `Authorization: Bearer <MCP_AUTH_TOKEN>`. Returns `Some(401)`
/// if absent/mismatched, `None` if the request may proceed. When no token
/// is configured the gate is disabled (the OAuth front channel is then not
/// mounted by the transport layer at all, but this guards direct calls
/// regardless).
fn check_bearer(state: &OAuthState, headers: &axum::http::HeaderMap) -> Option<Response> {
    let Some(expected) = &state.auth_token else { return None };
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if presented == Some(expected.as_str()) {
        return None;
    }

    let metadata_url = format!("{}/.well-known/oauth-protected-resource", state.resource_url);
    let challenge = BearerChallenge::new(metadata_url).with_error("invalid_token", "missing or invalid bearer token");
    let mut response = StatusCode::UNAUTHORIZED.into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_str(&challenge.to_header_value()).expect("header value is ASCII"),
    );
    Some(response)
}

fn url_encode(s: &str) -> String {
    let mut encoded = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state(auth_token: Option<&str>) -> Arc<OAuthState> {
        Arc::new(OAuthState {
            store: Arc::new(OAuthStore::new()),
            resource_url: "https://mcp.example.com".to_string(),
            auth_servers: Vec::new(),
            auth_token: auth_token.map(str::to_string),
        })
    }

    #[test]
    fn test_check_bearer_rejects_missing_header() {
        let state = test_state(Some("secret"));
        let headers = axum::http::HeaderMap::new();
        assert!(check_bearer(&state, &headers).is_some());
    }

    #[test]
    fn test_check_bearer_accepts_matching_token() {
        let state = test_state(Some("secret"));
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
        assert!(check_bearer(&state, &headers).is_none());
    }

    #[test]
    fn test_check_bearer_disabled_when_no_token_configured() {
        let state = test_state(None);
        let headers = axum::http::HeaderMap::new();
        assert!(check_bearer(&state, &headers).is_none());
    }

    #[test]
    fn test_url_encode_percent_escapes_reserved_characters() {
        assert_eq!(url_encode("a b&c"), "a%20b%26c");
    }
}
