//! Axum handlers for the JSON API and the health check.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use sonar_core::{AlertReport, AlertStatus, ObjectClass, TrainingReport};

use super::run_blocking;
use crate::error::HttpError;
use crate::state::AppState;

// ── Request / response shapes ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    pub signal: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
    pub class: ObjectClass,
    /// Dataset label, `R` or `M`.
    pub label: &'static str,
    pub headline: &'static str,
    pub alert: AlertReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub model_ready: bool,
    pub model_error: Option<String>,
    pub training: Option<TrainingReport>,
    pub alert: AlertStatus,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// `POST /api/detect`
pub async fn detect(
    State(state): State<AppState>,
    Json(request): Json<DetectRequest>,
) -> Result<Json<DetectResponse>, HttpError> {
    let detection = run_blocking(&state, move |ctx| ctx.detection.detect(&request.signal)).await??;

    Ok(Json(DetectResponse {
        class: detection.class,
        label: detection.class.label(),
        headline: detection.headline,
        alert: detection.alert,
    }))
}

/// `POST /api/alert/stop`
pub async fn stop_alert(State(state): State<AppState>) -> Result<Json<AlertStatus>, HttpError> {
    Ok(Json(
        run_blocking(&state, |ctx| ctx.detection.stop_alert()).await?,
    ))
}

/// `GET /api/status`
pub async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, HttpError> {
    let alert = run_blocking(&state, |ctx| ctx.detection.alert_status()).await?;

    Ok(Json(StatusResponse {
        model_ready: state.detection.model_ready(),
        model_error: state.model_error().map(str::to_string),
        training: state.training.clone(),
        alert,
    }))
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
