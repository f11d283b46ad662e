//! HTTP transport: the streamable `/mcp` endpoint, resumable SSE replay,
//! cancellation, health, and the OAuth 2.1 front channel (spec.md §6).

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::oauth::handlers as oauth_handlers;
use crate::oauth::handlers::OAuthState;
use crate::protocol::jsonrpc::{error_code, JsonRpcRequest, JsonRpcResponse};
use crate::protocol::router::OutboundSink;
use crate::server::McpServer;
use crate::session::sse::{BufferedEvent, ReplayOutcome};
use crate::session::Session;

const SESSION_HEADER: &str = "Mcp-Session-Id";

pub async fn run(server: Arc<McpServer>) -> anyhow::Result<()> {
    let addr = std::net::SocketAddr::from((
        server.config.host.parse::<std::net::IpAddr>().unwrap_or(std::net::IpAddr::from([0, 0, 0, 0])),
        server.config.port,
    ));

    let router = build_router(server.clone());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP transport listening");

    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal(server)).await?;
    tracing::info!("HTTP transport shut down");
    Ok(())
}

fn build_router(server: Arc<McpServer>) -> Router {
    let oauth_state = Arc::new(OAuthState {
        store: server.oauth.clone(),
        resource_url: server.config.resource_url.clone(),
        auth_servers: server.config.auth_servers.clone(),
        auth_token: server.config.auth_token.clone(),
    });

    let oauth_router = Router::new()
        .route("/.well-known/oauth-authorization-server", get(oauth_handlers::handle_auth_server_metadata))
        .route("/.well-known/oauth-protected-resource", get(oauth_handlers::handle_protected_resource))
        .route("/register", post(oauth_handlers::handle_register))
        .route("/authorize", get(oauth_handlers::handle_authorize_get).post(oauth_handlers::handle_authorize_post))
        .route("/token", post(oauth_handlers::handle_token))
        .with_state(oauth_state);

    let mcp_router = Router::new()
        .route("/mcp", get(handle_mcp_get).post(handle_mcp_post))
        .route("/api/cancel", post(handle_cancel))
        .route("/api/health", get(handle_health))
        .route("/api/chat", post(handle_chat))
        .with_state(server);

    Router::new().merge(oauth_router).merge(mcp_router).layer(CorsLayer::permissive()).layer(TraceLayer::new_for_http())
}

async fn shutdown_signal(server: Arc<McpServer>) {
    tokio::signal::ctrl_c().await.expect("failed to install CTRL+C handler");
    tracing::info!("received shutdown signal");
    server.shutdown.shutdown().await;
}

async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[derive(Debug, Deserialize)]
struct CancelRequest {
    #[serde(rename = "sessionId")]
    session_id: String,
}

#[derive(Debug, Serialize)]
struct CancelResponse {
    cancelled: bool,
}

async fn handle_cancel(State(server): State<Arc<McpServer>>, Json(req): Json<CancelRequest>) -> impl IntoResponse {
    let cancelled = server.cancellation.cancel(&req.session_id).await;
    Json(CancelResponse { cancelled })
}

/// An SSE-streaming chat pipeline is an external collaborator of this
/// server; it is not implemented here.
async fn handle_chat() -> Response {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(serde_json::json!({
            "error": "not_implemented",
            "error_description": "the chat pipeline is not part of this server"
        })),
    )
        .into_response()
}

async fn handle_mcp_post(State(server): State<Arc<McpServer>>, headers: HeaderMap, Json(request): Json<JsonRpcRequest>) -> Response {
    let is_initialize = request.method == "initialize";

    let session = if is_initialize {
        server.sessions.create_session().await
    } else {
        let Some(id) = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) else {
            return missing_session_response();
        };
        let Some(session) = server.sessions.get(id).await else {
            return missing_session_response();
        };
        session
    };

    let outbound = sse_outbound(session.clone());
    let response = server.router.route(&session, request, outbound).await;

    match response {
        None => StatusCode::ACCEPTED.into_response(),
        Some(response) => {
            let mut res = Json(response).into_response();
            res.headers_mut().insert(SESSION_HEADER, session.id.parse().expect("session id is ASCII hex"));
            res
        }
    }
}

async fn handle_mcp_get(State(server): State<Arc<McpServer>>, headers: HeaderMap) -> Response {
    let Some(id) = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) else {
        return missing_session_response();
    };
    let Some(session) = server.sessions.get(id).await else {
        return missing_session_response();
    };

    let last_event_id: u64 =
        headers.get("Last-Event-ID").and_then(|v| v.to_str().ok()).and_then(|s| s.parse().ok()).unwrap_or(0);

    tracing::info!(session_id = %session.id, last_event_id, "new SSE stream connection");

    let stream = build_sse_stream(session, last_event_id).await;

    (
        [("X-Accel-Buffering", "no"), ("Cache-Control", "no-cache, no-store, must-revalidate")],
        Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("ping")),
    )
        .into_response()
}

async fn build_sse_stream(session: Arc<Session>, last_event_id: u64) -> impl Stream<Item = Result<Event, Infallible>> {
    let (replay, replay_impossible) = match session.sse.events_after(last_event_id).await {
        ReplayOutcome::Replayed(events) => (events, false),
        ReplayOutcome::Impossible => {
            tracing::warn!(session_id = %session.id, "requested replay point is no longer buffered");
            (Vec::new(), true)
        }
    };

    let gap_event: Vec<Result<Event, Infallible>> = if replay_impossible {
        vec![Ok(Event::default()
            .event("replay-impossible")
            .data("the requested Last-Event-ID is no longer buffered; re-initialize the session"))]
    } else {
        Vec::new()
    };
    let gap_stream = stream::iter(gap_event);

    let replay_stream = stream::iter(replay.into_iter().map(|e: BufferedEvent| Ok::<_, Infallible>(e.to_sse_event())));

    let receiver = session.sse.subscribe();
    let live_stream = BroadcastStream::new(receiver).filter_map(|result| async move {
        match result {
            Ok(event) => Some(Ok(event.to_sse_event())),
            Err(_lagged) => None,
        }
    });

    gap_stream.chain(replay_stream).chain(live_stream)
}

/// Bridge the router's synchronous [`OutboundSink`] callback to the
/// session's async SSE ring: every outbound notification is buffered for
/// replay and broadcast to live subscribers under the event type `message`.
fn sse_outbound(session: Arc<Session>) -> OutboundSink {
    Arc::new(move |frame: serde_json::Value| {
        let session = session.clone();
        tokio::spawn(async move {
            session.sse.send("message", frame.to_string()).await;
        });
    })
}

fn missing_session_response() -> Response {
    let body = JsonRpcResponse::error(None, error_code::INVALID_REQUEST, "missing or unknown Mcp-Session-Id");
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
