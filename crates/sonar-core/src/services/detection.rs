//! The classification entry point.
//!
//! One call per "Detect Object" press: parse, classify, then hand the
//! announcement to the alert port. Parsing happens first so that a typo never
//! disturbs an alert that is already running.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{InputError, ObjectClass, parse_signal};
use crate::ports::{AlertPort, AlertReport, AlertStatus, ModelHandle};

/// Result of a successful detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub class: ObjectClass,
    pub headline: &'static str,
    pub alert: AlertReport,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DetectError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Model is not available: {0}")]
    ModelUnavailable(String),
}

/// Wires the trained model to the alert controller.
pub struct DetectionService {
    model: ModelHandle,
    alerts: Arc<dyn AlertPort>,
}

impl DetectionService {
    pub fn new(model: ModelHandle, alerts: Arc<dyn AlertPort>) -> Self {
        Self { model, alerts }
    }

    /// Classify the raw input text and start the matching alert.
    pub fn detect(&self, raw: &str) -> Result<Detection, DetectError> {
        let signal = parse_signal(raw)?;

        let classifier = match &self.model {
            ModelHandle::Ready(classifier) => classifier,
            ModelHandle::Unavailable(reason) => {
                return Err(DetectError::ModelUnavailable(reason.clone()));
            }
        };

        let class = classifier.predict(&signal);
        tracing::info!(class = %class, "Object classified");

        self.alerts.stop();
        let alert = self
            .alerts
            .start(class.announcement(), class.alert_mode())
            .unwrap_or_else(|e| AlertReport::SpeechFailed {
                message: e.to_string(),
            });

        if let Some(problem) = alert.problem() {
            tracing::warn!(class = %class, "{problem}");
        }

        Ok(Detection {
            class,
            headline: class.headline(),
            alert,
        })
    }

    /// The "Stop Alert" action.
    pub fn stop_alert(&self) -> AlertStatus {
        self.alerts.stop();
        self.alerts.status()
    }

    pub fn alert_status(&self) -> AlertStatus {
        self.alerts.status()
    }

    /// Backend-unavailable notice, returned once.
    pub fn take_speech_notice(&self) -> Option<String> {
        self.alerts.take_unavailable_notice()
    }

    pub const fn model(&self) -> &ModelHandle {
        &self.model
    }

    pub const fn model_ready(&self) -> bool {
        self.model.is_ready()
    }
}
