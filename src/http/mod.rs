//! HTTP surface.
//!
//! Thin route layer: each handler parses one request, calls one engine
//! operation, and maps the typed error onto a status code. All
//! invariants live in the engine, none here.

mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::json;

use crate::database::repository::{CallRepository, ReportRepository, UserRepository};
use crate::engine::{CallTracker, ModerationEngine, PresenceRegistry, ReportQueue, StatusResolver};
use crate::error::EngineError;

/// Engine components shared across handlers.
pub struct AppState {
    pub resolver: StatusResolver<UserRepository>,
    pub moderation: ModerationEngine<UserRepository>,
    pub calls: CallTracker<CallRepository>,
    pub reports: ReportQueue<ReportRepository, UserRepository>,
    pub presence: PresenceRegistry<UserRepository>,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Gating
        .route("/status/:user_id", get(handlers::status))
        // Presence
        .route(
            "/presence/:user_id",
            post(handlers::register_presence).get(handlers::lookup_user),
        )
        .route("/presence/:user_id/connection", post(handlers::set_connection))
        // Moderation
        .route("/moderation/:user_id/ban", post(handlers::ban))
        .route("/moderation/:user_id/unban", post(handlers::unban))
        .route("/moderation/:user_id/quarantine", post(handlers::quarantine))
        .route(
            "/moderation/:user_id/unquarantine",
            post(handlers::unquarantine),
        )
        // Calls
        .route("/calls", post(handlers::start_call))
        .route("/calls/active", get(handlers::active_calls))
        .route("/calls/:call_id/end", post(handlers::end_call))
        // Reports
        .route("/reports", post(handlers::submit_report).get(handlers::list_reports))
        .route("/reports/:report_id/status", post(handlers::update_report_status))
        // 404 for everything else
        .fallback(handlers::fallback)
        .with_state(state)
}

/// Engine error with an HTTP mapping.
pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            EngineError::InvalidArgument(m) => (StatusCode::BAD_REQUEST, m.clone()),
            EngineError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            EngineError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
            EngineError::Store(e) => {
                tracing::error!("Store failure: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store unavailable, retry".to_string(),
                )
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}
