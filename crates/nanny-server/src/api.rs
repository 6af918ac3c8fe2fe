use crate::runtime::HandleError;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use nanny_engine::EngineError;
use nanny_types::Pin;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    BadGateway(String),
    Unavailable(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

impl From<HandleError> for ApiError {
    fn from(err: HandleError) -> Self {
        let message = err.to_string();
        match err {
            HandleError::Engine(EngineError::UnknownDevice(_))
            | HandleError::Engine(EngineError::UnknownControl { .. }) => {
                ApiError::NotFound(message)
            }
            HandleError::Engine(EngineError::MalformedMessage(_)) => ApiError::BadRequest(message),
            HandleError::Engine(EngineError::Transport(_)) => ApiError::BadGateway(message),
            HandleError::Engine(EngineError::Registry(_)) => ApiError::InternalError(message),
            HandleError::Stopped => ApiError::Unavailable(message),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ControlRequest {
    pub value: f64,
}

/// 提交一条遥测消息（与传输层消息格式相同）
async fn post_telemetry(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state.engine.telemetry(body.to_vec()).await?;

    Ok(Json(json!({
        "status": "ok",
        "applied": summary.applied(),
        "unknown_devices": summary.unknown_devices,
    })))
}

async fn list_devices(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let devices = state.engine.inspect().await?;
    Ok(Json(json!({ "devices": devices })))
}

async fn set_control(
    State(state): State<Arc<AppState>>,
    Path((device, pin)): Path<(String, Pin)>,
    Json(req): Json<ControlRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.engine.manual(&device, pin, req.value).await?;

    Ok(Json(json!({
        "device": device,
        "control": pin,
        "value": req.value,
    })))
}

async fn toggle_control(
    State(state): State<Arc<AppState>>,
    Path((device, pin)): Path<(String, Pin)>,
) -> Result<impl IntoResponse, ApiError> {
    let value = state.engine.toggle(&device, pin).await?;

    Ok(Json(json!({
        "device": device,
        "control": pin,
        "value": value,
    })))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/v1/telemetry", post(post_telemetry))
        .route("/api/v1/devices", get(list_devices))
        .route("/api/v1/devices/:device/controls/:pin", post(set_control))
        .route(
            "/api/v1/devices/:device/controls/:pin/toggle",
            post(toggle_control),
        )
        .with_state(state)
}
