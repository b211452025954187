//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where the CLI wires infrastructure
//! together: settings from the environment and flags, the startup model, and
//! the alert controller. Command handlers receive the composed
//! [`CliContext`].

use std::sync::Arc;

use sonar_core::{
    AlertPort, DetectionService, Settings, TrainingConfig, TrainingReport,
    startup_model, validate_settings,
};
use sonar_voice::{AlertConfig, AlertController, AlertEvent};
use tokio::sync::mpsc;

use crate::error::CliError;
use crate::parser::Cli;

/// Whether alerts should be spoken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeechMode {
    /// Probe for a system speech program.
    #[default]
    System,
    /// Never speak (`--mute`).
    Muted,
}

/// Resolve settings: `SONAR_*` variables, then flags, then validation.
pub fn load_settings(cli: &Cli) -> Result<Settings, CliError> {
    let mut settings = Settings::from_env()?;
    cli.apply_overrides(&mut settings);
    validate_settings(&settings)?;
    tracing::debug!(?settings, "Settings resolved");
    Ok(settings)
}

/// Fully composed context for commands that classify.
pub struct CliContext {
    pub settings: Settings,
    pub detection: DetectionService,
    /// Startup training summary; `None` when training failed.
    pub training: Option<TrainingReport>,
}

impl CliContext {
    /// Assemble a context from already-built parts.
    pub const fn from_parts(
        settings: Settings,
        detection: DetectionService,
        training: Option<TrainingReport>,
    ) -> Self {
        Self {
            settings,
            detection,
            training,
        }
    }
}

/// Build the alert controller for `mode`.
pub fn alert_controller(settings: &Settings, mode: SpeechMode) -> AlertController {
    let (controller, events) = match mode {
        SpeechMode::System => AlertController::from_settings(settings),
        SpeechMode::Muted => {
            AlertController::unavailable("muted", AlertConfig::from_settings(settings))
        }
    };
    bridge_events(events);
    controller
}

/// Log alert events when running inside a runtime; otherwise drop them.
fn bridge_events(events: mpsc::UnboundedReceiver<AlertEvent>) {
    if tokio::runtime::Handle::try_current().is_ok() {
        sonar_axum::spawn_event_bridge(events);
    }
}

/// Train the model and build the detection service.
pub fn bootstrap(settings: Settings, speech: SpeechMode) -> CliContext {
    let dataset = settings.effective_dataset_path();
    tracing::debug!(dataset = %dataset.display(), "CLI bootstrap");

    let (model, training) =
        startup_model(&dataset, &settings.split_config(), &TrainingConfig::default());
    let alerts: Arc<dyn AlertPort> = Arc::new(alert_controller(&settings, speech));

    CliContext::from_parts(settings, DetectionService::new(model, alerts), training)
}
