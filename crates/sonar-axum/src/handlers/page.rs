//! Handlers for the HTML page: `GET /`, `POST /detect`, `POST /stop`.
//!
//! Problems with the input are rendered into the page with status 200, the
//! same way the form shows them; only infrastructure failures are errors.

use axum::Form;
use axum::extract::State;
use axum::response::Html;
use serde::Deserialize;
use sonar_core::DetectError;

use super::run_blocking;
use crate::error::HttpError;
use crate::render::{self, Outcome, PageView};
use crate::state::AppState;

/// The page's single form.
#[derive(Debug, Default, Deserialize)]
pub struct SignalForm {
    #[serde(default)]
    pub signal: String,
}

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, HttpError> {
    let (speech_notice, alert) = run_blocking(&state, |ctx| {
        (
            ctx.detection.take_speech_notice(),
            ctx.detection.alert_status(),
        )
    })
    .await?;

    Ok(Html(render::page(&PageView {
        signal: "",
        outcome: None,
        speech_notice,
        model_error: state.model_error(),
        alert_state: alert.state,
    })))
}

/// `POST /detect`
pub async fn detect(
    State(state): State<AppState>,
    Form(form): Form<SignalForm>,
) -> Result<Html<String>, HttpError> {
    let signal = form.signal.clone();
    let (result, speech_notice, alert) = run_blocking(&state, move |ctx| {
        let result = ctx.detection.detect(&signal);
        (
            result,
            ctx.detection.take_speech_notice(),
            ctx.detection.alert_status(),
        )
    })
    .await?;

    let outcome = match result {
        Ok(detection) => Outcome::Detected {
            class: detection.class,
            speech_problem: detection.alert.problem(),
        },
        Err(DetectError::Input(e)) => {
            tracing::debug!(error = %e, "Rejected signal input");
            Outcome::InvalidInput {
                summary: e.summary(),
                detail: e.to_string(),
            }
        }
        Err(DetectError::ModelUnavailable(reason)) => Outcome::ModelUnavailable(reason),
    };

    Ok(Html(render::page(&PageView {
        signal: &form.signal,
        outcome: Some(outcome),
        speech_notice,
        model_error: state.model_error(),
        alert_state: alert.state,
    })))
}

/// `POST /stop`
pub async fn stop(
    State(state): State<AppState>,
    Form(form): Form<SignalForm>,
) -> Result<Html<String>, HttpError> {
    let alert = run_blocking(&state, |ctx| ctx.detection.stop_alert()).await?;

    Ok(Html(render::page(&PageView {
        signal: &form.signal,
        outcome: Some(Outcome::Stopped),
        speech_notice: None,
        model_error: state.model_error(),
        alert_state: alert.state,
    })))
}
