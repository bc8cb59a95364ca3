//! Relay route handlers.
//!
//! `POST /api/chat` forwards a JSON body to `{backend}/chat` and relays
//! the response whole. `POST /api/chat/stream` forwards the raw body to
//! `{backend}/chat/stream` and pipes the response bytes through without
//! buffering. Both respond 500 up front when no backend URL is
//! configured, and relay upstream error bodies with the upstream status.

use axum::{Json, Router};
use axum::body::Body;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::{Value, json};
use std::net::SocketAddr;
use tracing::{debug, info, warn};

/// Header carrying the backend credential.
const API_KEY_HEADER: &str = "X-API-Key";

/// Shared state for the relay handlers.
#[derive(Clone)]
pub struct RelayState {
    /// Upstream origin, e.g. `https://rag.example.com`. `None` means
    /// unconfigured: requests are answered 500 without a network call.
    pub backend_url: Option<String>,
    /// Credential forwarded in the API key header; may be empty.
    pub api_key: String,
    pub client: reqwest::Client,
}

impl RelayState {
    pub fn new(backend_url: Option<String>, api_key: impl Into<String>) -> Self {
        Self {
            backend_url,
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }
}

/// Build the relay router.
pub fn build_router(state: RelayState) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/stream", post(chat_stream_handler))
        .with_state(state)
}

/// Bind `addr` and serve the relay until the process exits.
pub async fn serve(addr: SocketAddr, state: RelayState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("relay listening on {}", listener.local_addr()?);
    if state.backend_url.is_none() {
        warn!("BACKEND_URL is not configured; chat requests will fail");
    }
    axum::serve(listener, build_router(state)).await
}

fn config_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Backend URL not configured" })),
    )
        .into_response()
}

fn connect_error(error: reqwest::Error) -> Response {
    warn!("backend unreachable: {}", error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": error.to_string() })),
    )
        .into_response()
}

fn relay_status(upstream: &reqwest::Response) -> StatusCode {
    StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY)
}

fn upstream_content_type(upstream: &reqwest::Response, fallback: &'static str) -> String {
    upstream
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(fallback)
        .to_string()
}

/// Non-streaming proxy: JSON in, whole response out.
async fn chat_handler(State(state): State<RelayState>, Json(body): Json<Value>) -> Response {
    let Some(backend_url) = state.backend_url.as_deref() else {
        return config_error();
    };

    let upstream = match state
        .client
        .post(format!("{}/chat", backend_url))
        .header(CONTENT_TYPE, "application/json")
        .header(API_KEY_HEADER, &state.api_key)
        .json(&body)
        .send()
        .await
    {
        Ok(response) => response,
        Err(error) => return connect_error(error),
    };

    let status = relay_status(&upstream);
    if !status.is_success() {
        let text = upstream.text().await.unwrap_or_default();
        let message = if text.is_empty() {
            format!("Backend error: {}", status.as_u16())
        } else {
            text
        };
        debug!("backend answered {}: {}", status, message);
        return (status, Json(json!({ "error": message }))).into_response();
    }

    let content_type = upstream_content_type(&upstream, "application/json");
    match upstream.bytes().await {
        Ok(bytes) => (status, [(CONTENT_TYPE, content_type)], bytes).into_response(),
        Err(error) => connect_error(error),
    }
}

/// Streaming proxy: raw body in, upstream bytes piped straight out.
async fn chat_stream_handler(State(state): State<RelayState>, body: String) -> Response {
    let Some(backend_url) = state.backend_url.as_deref() else {
        return config_error();
    };

    let upstream = match state
        .client
        .post(format!("{}/chat/stream", backend_url))
        .header(CONTENT_TYPE, "application/json")
        .header(API_KEY_HEADER, &state.api_key)
        .body(body)
        .send()
        .await
    {
        Ok(response) => response,
        Err(error) => return connect_error(error),
    };

    let status = relay_status(&upstream);
    if !status.is_success() {
        let text = upstream.text().await.unwrap_or_default();
        return (status, text).into_response();
    }

    let content_type = upstream_content_type(&upstream, "text/plain; charset=utf-8");
    (
        status,
        [
            (CONTENT_TYPE, content_type),
            (CACHE_CONTROL, "no-cache".to_string()),
        ],
        Body::from_stream(upstream.bytes_stream()),
    )
        .into_response()
}
