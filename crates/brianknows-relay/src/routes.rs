use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use brianknows_core::{Agent, KnowledgeBase, Payload};

use crate::error::ApiError;
use crate::upstream::{Operation, UpstreamClient, UpstreamError};

/// Shared application state. Immutable after start-up.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self {
            upstream: Arc::new(upstream),
        }
    }
}

/// Build the relay router: one route per upstream resource plus `/health`,
/// open to cross-origin callers from any origin.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            Operation::ListAgents.path(),
            get(list_agents).post(create_agent),
        )
        .route(
            Operation::ListKnowledgeBases.path(),
            get(list_knowledge_bases).post(create_knowledge_base),
        )
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        // Echoes the caller's origin, method and headers, with credentials allowed.
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Wrap upstream bytes as-is in a JSON response.
fn relay(result: Result<Bytes, UpstreamError>) -> Result<Response, ApiError> {
    let body = result?;
    Ok(([(CONTENT_TYPE, "application/json")], body).into_response())
}

/// `GET /agents`
pub async fn list_agents(State(state): State<AppState>) -> Result<Response, ApiError> {
    relay(state.upstream.list_agents().await)
}

/// `POST /agents`
pub async fn create_agent(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let agent = Agent::from_json(&body)?;
    relay(state.upstream.create_agent(&agent).await)
}

/// `GET /knowledge-bases`
pub async fn list_knowledge_bases(State(state): State<AppState>) -> Result<Response, ApiError> {
    relay(state.upstream.list_knowledge_bases().await)
}

/// `POST /knowledge-bases`
pub async fn create_knowledge_base(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let knowledge_base = KnowledgeBase::from_json(&body)?;
    relay(state.upstream.create_knowledge_base(&knowledge_base).await)
}

/// `GET /health`: answered locally without touching the upstream.
pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
