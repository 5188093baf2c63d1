//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    state::{AppState, SlotStatus},
    timers::SlotName,
};
use super::responses::{
    ApiResponse, EditRequest, HealthResponse, LifecycleResponse, ManualRequest, SaveRequest,
    SaveResponse, StatusResponse,
};

fn parse_slot(raw: &str) -> Result<SlotName, StatusCode> {
    raw.parse().map_err(|e| {
        warn!("{}", e);
        StatusCode::NOT_FOUND
    })
}

fn internal(context: &str) -> impl FnOnce(String) -> StatusCode + '_ {
    move |e| {
        error!("{}: {}", context, e);
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Handle POST /timers/:slot/start
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let slot = parse_slot(&slot)?;
    let outcome = state.start(slot).map_err(internal("Failed to start timer"))?;
    info!("Start endpoint called for {} (applied={})", slot, outcome.applied);
    Ok(Json(ApiResponse::from_outcome(
        outcome,
        "Timer started",
        "Timer already running or being edited",
    )))
}

/// Handle POST /timers/:slot/stop
pub async fn stop_handler(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let slot = parse_slot(&slot)?;
    let outcome = state.stop(slot).map_err(internal("Failed to stop timer"))?;
    info!("Stop endpoint called for {} (applied={})", slot, outcome.applied);
    Ok(Json(ApiResponse::from_outcome(
        outcome,
        "Timer stopped",
        "Timer was not running",
    )))
}

/// Handle POST /timers/:slot/reset
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let slot = parse_slot(&slot)?;
    let outcome = state.reset(slot).map_err(internal("Failed to reset timer"))?;
    Ok(Json(ApiResponse::from_outcome(outcome, "Timer reset", "")))
}

/// Handle POST /timers/:slot/manual - overwrite the duration fields
pub async fn manual_handler(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<String>,
    Json(body): Json<ManualRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let slot = parse_slot(&slot)?;
    let outcome = state
        .manual_set(slot, &body.minutes, &body.seconds, body.hours.as_deref())
        .map_err(internal("Failed to set manual duration"))?;
    Ok(Json(ApiResponse::from_outcome(
        outcome,
        "Manual duration set",
        "Manual entry is disabled while the timer runs",
    )))
}

/// Handle POST /timers/:slot/edit - load a saved record for editing
pub async fn edit_handler(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<String>,
    Json(body): Json<EditRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let slot = parse_slot(&slot)?;
    let outcome = state
        .open_for_edit(slot, &body.details)
        .map_err(internal("Failed to open record for editing"))?;
    Ok(Json(ApiResponse::from_outcome(
        outcome,
        "Record loaded for editing",
        "Timer is running",
    )))
}

/// Handle POST /timers/:slot/save - commit the duration as a record
pub async fn save_handler(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<String>,
    Json(body): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, (StatusCode, Json<ApiResponse>)> {
    let slot = parse_slot(&slot)
        .map_err(|code| (code, Json(ApiResponse::error("Unknown timer slot".to_string()))))?;

    match state.save_record(slot, body.notes) {
        Ok(record) => Ok(Json(SaveResponse {
            status: "saved".to_string(),
            record,
        })),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::error(e)))),
    }
}

/// Handle GET /timers
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SlotStatus>>, StatusCode> {
    state
        .get_statuses()
        .map(Json)
        .map_err(internal("Failed to read timers"))
}

/// Handle GET /timers/:slot
pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<String>,
) -> Result<Json<SlotStatus>, StatusCode> {
    let slot = parse_slot(&slot)?;
    state
        .get_status(slot)
        .map(Json)
        .map_err(internal("Failed to read timer"))
}

/// Handle POST /lifecycle/background - teardown snapshot
pub async fn background_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LifecycleResponse>, StatusCode> {
    let saved = state
        .background()
        .map_err(internal("Failed to save teardown snapshot"))?;
    let timers = state.get_statuses().map_err(internal("Failed to read timers"))?;
    Ok(Json(LifecycleResponse {
        status: "background".to_string(),
        snapshots_saved: Some(saved),
        recovery: None,
        timers,
    }))
}

/// Handle POST /lifecycle/foreground - run recovery
pub async fn foreground_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LifecycleResponse>, StatusCode> {
    let report = state.foreground().map_err(internal("Failed to recover timers"))?;
    let timers = state.get_statuses().map_err(internal("Failed to read timers"))?;
    Ok(Json(LifecycleResponse {
        status: "foreground".to_string(),
        snapshots_saved: None,
        recovery: Some(report),
        timers,
    }))
}

/// Handle GET /status - Return current status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let timers = state.get_statuses().map_err(internal("Failed to read timers"))?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        running: timers.iter().filter(|t| t.is_active()).count(),
        timers,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
