//! HTTP adapter: chat API and web UI
//!
//! This module exposes the turn pipeline over HTTP with axum. `POST /chat`
//! takes `{name, age, message}` and returns `{"response": ...}`; failures
//! surface as `500` with the error text in the body, matching the terminal
//! client's expectations. `GET /` serves the single-page web UI and
//! `POST /reset` discards all session state.

use crate::assistant::DoctorAssistant;
use crate::config::Config;
use crate::error::Result;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The assistant shared by all requests
    pub assistant: Arc<DoctorAssistant>,
}

/// Request body for the chat route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Patient name (also the session key)
    pub name: String,
    /// Patient age in years
    pub age: u32,
    /// The user's message for this turn
    pub message: String,
}

/// Response body for the chat route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant's reply
    pub response: String,
}

/// Build the application router
///
/// # Arguments
///
/// * `state` - Shared handler state
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/chat", post(chat))
        .route("/reset", post(reset))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Run the HTTP server until shutdown
///
/// # Errors
///
/// Returns error if binding or serving fails
pub async fn run_server(config: &Config, assistant: Arc<DoctorAssistant>) -> Result<()> {
    let state = AppState { assistant };
    let router = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Hekim server listening on http://{}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}

/// Serve the web UI page
async fn index() -> Html<&'static str> {
    Html(include_str!("../assets/index.html"))
}

/// Liveness probe
async fn healthz() -> &'static str {
    "ok"
}

/// Handle one chat turn
///
/// Any pipeline failure maps to a 500 with the error text in the body; a
/// failed turn leaves the session history unchanged.
async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> std::result::Result<Json<ChatResponse>, (StatusCode, String)> {
    tracing::debug!("Chat turn for {}", request.name);

    match state
        .assistant
        .send_turn(&request.name, request.age, &request.message)
        .await
    {
        Ok(reply) => Ok(Json(ChatResponse { response: reply })),
        Err(e) => {
            tracing::error!("Chat turn failed for {}: {}", request.name, e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Discard all session state
async fn reset(State(state): State<AppState>) -> StatusCode {
    state.assistant.reset();
    StatusCode::NO_CONTENT
}
