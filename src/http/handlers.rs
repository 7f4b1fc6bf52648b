//! Request handlers, one per engine operation.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::database::models::{Report, ReportFilter, ReportStatus};
use crate::error::EngineError;

use super::{ApiError, AppState};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn fallback() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}

// --- Gating ---

pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state.resolver.resolve(&user_id).await?;
    Ok(Json(status))
}

// --- Presence ---

#[derive(Debug, Deserialize)]
pub struct PresenceBody {
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub country: String,
}

pub async fn register_presence(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<PresenceBody>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .presence
        .register_or_refresh(&user_id, &body.ip, &body.country)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

#[derive(Debug, Deserialize)]
pub struct ConnectionBody {
    pub connected: bool,
}

pub async fn set_connection(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<ConnectionBody>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .presence
        .set_connection(&user_id, body.connected)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn lookup_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.presence.lookup(&user_id).await? {
        Some(user) => Ok(Json(user).into_response()),
        None => Err(EngineError::not_found(format!("user {user_id}")).into()),
    }
}

// --- Moderation ---

#[derive(Debug, Default, Deserialize)]
pub struct ModerationBody {
    #[serde(default)]
    pub reason: String,
    pub level: Option<u32>,
    pub admin_id: Option<String>,
}

pub async fn ban(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    body: Option<Json<ModerationBody>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    state
        .moderation
        .ban(&user_id, &body.reason, body.admin_id.as_deref())
        .await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn unban(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.moderation.unban(&user_id).await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn quarantine(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    body: Option<Json<ModerationBody>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    state
        .moderation
        .quarantine(&user_id, &body.reason, body.level, body.admin_id.as_deref())
        .await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn unquarantine(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.moderation.unquarantine(&user_id).await?;
    Ok(Json(json!({ "ok": true })))
}

// --- Calls ---

#[derive(Debug, Deserialize)]
pub struct StartCallBody {
    pub call_id: String,
    pub user1_id: String,
    pub user2_id: String,
}

pub async fn start_call(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartCallBody>,
) -> Result<impl IntoResponse, ApiError> {
    let call = state
        .calls
        .start_call(&body.call_id, &body.user1_id, &body.user2_id)
        .await?;
    Ok((StatusCode::CREATED, Json(call)))
}

#[derive(Debug, Deserialize)]
pub struct EndCallBody {
    #[serde(default)]
    pub reason: String,
}

pub async fn end_call(
    State(state): State<Arc<AppState>>,
    Path(call_id): Path<String>,
    Json(body): Json<EndCallBody>,
) -> Result<impl IntoResponse, ApiError> {
    let call = state.calls.end_call(&call_id, &body.reason).await?;
    Ok(Json(call))
}

pub async fn active_calls(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let calls = state.calls.list_active().await?;
    Ok(Json(calls))
}

// --- Reports ---

#[derive(Debug, Deserialize)]
pub struct SubmitReportBody {
    pub reporter_id: String,
    pub reported_id: String,
    #[serde(default)]
    pub reason: String,
}

pub async fn submit_report(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitReportBody>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .reports
        .submit(&body.reporter_id, &body.reported_id, &body.reason)
        .await?;
    Ok((StatusCode::CREATED, Json(report_json(&report))))
}

#[derive(Debug, Deserialize)]
pub struct ReportsQuery {
    pub filter: Option<String>,
}

pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = match query.filter.as_deref() {
        None | Some("all") => ReportFilter::All,
        Some("pending") => ReportFilter::Pending,
        Some(other) => {
            return Err(EngineError::invalid(format!("unknown filter {other}")).into());
        }
    };

    let reports = state.reports.list(filter).await?;
    Ok(Json(reports.iter().map(report_json).collect::<Vec<_>>()))
}

#[derive(Debug, Deserialize)]
pub struct ReportStatusBody {
    pub status: String,
}

pub async fn update_report_status(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<String>,
    Json(body): Json<ReportStatusBody>,
) -> Result<impl IntoResponse, ApiError> {
    let status = ReportStatus::from_str(&body.status)
        .ok_or_else(|| EngineError::invalid(format!("unknown status {}", body.status)))?;

    state.reports.update_status(&report_id, status).await?;
    Ok(Json(json!({ "ok": true })))
}

/// Reports go out with the ObjectId as a plain hex string.
fn report_json(report: &Report) -> Value {
    json!({
        "report_id": report.id.to_hex(),
        "reporter_id": report.reporter_id,
        "reported_id": report.reported_id,
        "reason": report.reason,
        "status": report.status.as_str(),
        "timestamp": report.timestamp,
    })
}
