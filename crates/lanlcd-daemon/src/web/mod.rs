//! HTTP interface: informational page and the display command endpoint.

use askama::Template;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use lanlcd_hw::{DisplayCommand, NamedColor, PALETTE};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;

/// Main index page template.
#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    colors: &'static [NamedColor],
}

/// Errors reported to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or empty client input. Never reaches the device.
    #[error("{0}")]
    Validation(String),

    /// The serial link failed during the exchange.
    #[error("Serial error: {0}")]
    Transport(String),

    /// Anything else that went wrong while handling the request.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<lanlcd_hw::Error> for ApiError {
    fn from(e: lanlcd_hw::Error) -> Self {
        if e.is_transport() {
            ApiError::Transport(e.to_string())
        } else if e.is_validation() {
            ApiError::Validation(e.to_string())
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

impl From<askama::Error> for ApiError {
    fn from(e: askama::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            ApiError::Transport(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Serial error", "detail": detail }),
            ),
            ApiError::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal error", "detail": detail }),
            ),
        };
        if status.is_server_error() {
            warn!("{}", self);
        }
        (status, Json(body)).into_response()
    }
}

/// Successful command response.
#[derive(Debug, Serialize)]
struct SetResponse {
    status: &'static str,
    sent: DisplayCommand,
    uart_response: Option<String>,
}

/// Creates the web router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/set/", get(set_get).post(set_post))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - Usage page
async fn index() -> Result<Html<String>, ApiError> {
    let page = IndexTemplate { colors: &PALETTE }.render()?;
    Ok(Html(page))
}

/// GET /set/ - Display command from query parameters
async fn set_get(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<SetResponse>, ApiError> {
    let command = DisplayCommand::from_query_pairs(params)?;
    relay(&state, &command).await
}

/// POST /set/ - Display command from a JSON body
async fn set_post(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SetResponse>, ApiError> {
    let command = DisplayCommand::from_json_slice(&body)?;
    relay(&state, &command).await
}

async fn relay(state: &AppState, command: &DisplayCommand) -> Result<Json<SetResponse>, ApiError> {
    let relayed = state.relay(command).await?;
    Ok(Json(SetResponse {
        status: "ok",
        sent: relayed.sent,
        uart_response: relayed.reply,
    }))
}
