//! Alert port: trait abstraction over the audible alert controller.
//!
//! # Design Rules
//!
//! - DTOs here are transport-agnostic wire shapes (no `sonar-voice` types).
//! - `AlertController` in `sonar-voice` implements [`AlertPort`]; nothing in
//!   `sonar-core` depends on `sonar-voice`.
//! - Every method is blocking. Async adapters call them from
//!   `spawn_blocking`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AlertMode, AlertState};

// ── DTOs ─────────────────────────────────────────────────────────────────────

/// What happened when an alert was requested.
///
/// Speech is best-effort: an unavailable backend or a failing utterance is
/// reported here instead of being raised as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum AlertReport {
    /// A single utterance played to completion.
    Spoken { utterance: u64 },

    /// The repeating worker is running.
    LoopStarted,

    /// No speech backend; nothing was said.
    Muted { reason: String },

    /// The utterance failed part-way.
    SpeechFailed { message: String },
}

impl AlertReport {
    /// Message suitable for a UI warning line, if the alert did not play.
    #[must_use]
    pub fn problem(&self) -> Option<String> {
        match self {
            Self::Spoken { .. } | Self::LoopStarted => None,
            Self::Muted { reason } => Some(format!("Speech unavailable: {reason}")),
            Self::SpeechFailed { message } => Some(format!("Error during speech: {message}")),
        }
    }
}

/// Snapshot of the alert controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertStatus {
    pub state: AlertState,
    /// Utterances started since the process began.
    pub utterances: u64,
    /// Name of the speech backend, or `None` when speech is unavailable.
    pub backend: Option<String>,
    /// Why the backend could not be initialised.
    pub unavailable_reason: Option<String>,
    /// Most recent speech runtime error, if any.
    pub last_error: Option<String>,
}

// ── Error ─────────────────────────────────────────────────────────────────────

/// Contract violations when requesting an alert.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlertError {
    /// `start` was called with empty or whitespace-only text.
    #[error("Alert text must not be empty")]
    EmptyText,

    /// The OS refused to create the worker thread.
    #[error("Failed to spawn alert worker: {0}")]
    WorkerSpawn(String),
}

// ── Port trait ────────────────────────────────────────────────────────────────

/// Port trait for the audible alert.
///
/// Implemented by `AlertController` in `sonar-voice`.
/// Consumed by [`DetectionService`](crate::services::DetectionService).
pub trait AlertPort: Send + Sync {
    /// Start announcing `text`. Always retires any previous alert first.
    fn start(&self, text: &str, mode: AlertMode) -> Result<AlertReport, AlertError>;

    /// Stop the current alert and wait for the worker to exit. Idempotent.
    fn stop(&self);

    /// Current controller state.
    fn status(&self) -> AlertStatus;

    /// The backend-unavailable reason, returned once per process.
    fn take_unavailable_notice(&self) -> Option<String>;
}
