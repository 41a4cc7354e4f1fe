//! HTTP surface: maps each request path to its endpoint and serves the
//! encoded fixture.

use crate::endpoints::{EndpointConfig, NotFound, Registry};
use axum::body::Body;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Router;
use http::{header, Method, StatusCode, Uri};
use proto_json_tool::{EncodeError, Encoder};
use std::sync::Arc;

pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub encoder: Arc<Encoder>,
}

impl AppState {
    pub fn new(registry: Registry, encoder: Encoder) -> Self {
        Self {
            registry: Arc::new(registry),
            encoder: Arc::new(encoder),
        }
    }
}

/// Build the router. Every path is dispatched through the registry, so
/// matching is exact and independent of axum's path syntax.
pub fn build_router(state: AppState) -> Router {
    Router::new().fallback(handle_request).with_state(state)
}

async fn handle_request(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let path = uri.path();

    let endpoint = match state.registry.lookup(path) {
        Ok(endpoint) => endpoint.clone(),
        Err(not_found) => {
            tracing::warn!("{} {} -> 404", method, path);
            return not_found_response(&not_found, &state.registry);
        }
    };

    if method != Method::GET && method != Method::POST {
        tracing::warn!("{} {} -> 405", method, path);
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "GET, POST")],
            Body::empty(),
        )
            .into_response();
    }

    tracing::info!(
        "📥 {} {} -> {} (json: {}, proto: {})",
        method,
        uri,
        endpoint.message_type,
        endpoint.json_file.display(),
        endpoint.proto_file.display()
    );

    match encode_endpoint(state.encoder.clone(), endpoint.clone()).await {
        Ok(bytes) => {
            tracing::info!("📤 {} -> 200 ({} bytes protobuf)", path, bytes.len());
            protobuf_response(bytes)
        }
        Err(err) => {
            tracing::error!("{} -> 500 ({}): {}", endpoint.path, err.stage(), err);
            text_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ServeError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("Encoder task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServeError {
    fn stage(&self) -> &'static str {
        match self {
            ServeError::Encode(err) => err.stage(),
            ServeError::Task(_) => "task",
        }
    }
}

/// Schema compilation and file reads block, so they run off the async workers.
/// A panic inside the encoder surfaces as a `JoinError` for this request only.
async fn encode_endpoint(encoder: Arc<Encoder>, endpoint: EndpointConfig) -> Result<Vec<u8>, ServeError> {
    let bytes = tokio::task::spawn_blocking(move || encoder.encode(&endpoint.target())).await??;
    Ok(bytes)
}

fn protobuf_response(bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, PROTOBUF_CONTENT_TYPE),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        bytes,
    )
        .into_response()
}

fn not_found_response(not_found: &NotFound, registry: &Registry) -> Response {
    let available: Vec<&str> = registry.paths().collect();
    text_response(
        StatusCode::NOT_FOUND,
        format!("{}\nAvailable: {:?}", not_found, available),
    )
}

fn text_response(status: StatusCode, message: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message,
    )
        .into_response()
}
