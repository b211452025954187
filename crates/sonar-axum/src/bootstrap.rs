//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where the web adapter wires the trained
//! model and the speech backend together.

use std::sync::Arc;

use anyhow::Result;
use sonar_core::{
    AlertPort, DEFAULT_SERVER_PORT, DetectionService, Settings, TrainingConfig, TrainingReport,
    startup_model,
};
use sonar_voice::{AlertController, AlertEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port for the HTTP server.
    pub port: u16,
}

impl ServerConfig {
    /// Loopback on the default port.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_SERVER_PORT,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            port: settings.effective_server_port(),
            ..Self::with_defaults()
        }
    }

    /// Override the bind host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application context for the Axum adapter.
pub struct AxumContext {
    /// Classification plus the alert controller behind it.
    pub detection: DetectionService,
    /// Startup training summary; `None` when training failed.
    pub training: Option<TrainingReport>,
}

impl AxumContext {
    #[must_use]
    pub const fn new(detection: DetectionService, training: Option<TrainingReport>) -> Self {
        Self {
            detection,
            training,
        }
    }

    /// Why the model could not be trained, if it could not.
    pub fn model_error(&self) -> Option<&str> {
        self.detection.model().unavailable_reason()
    }
}

/// Bootstrap the web adapter: train the model and build the alert
/// controller from `settings`.
///
/// Training failure and a missing speech program both leave the server
/// usable; they are reported on the page instead.
pub async fn bootstrap(settings: &Settings) -> Result<AxumContext> {
    let dataset = settings.effective_dataset_path();
    let split = settings.split_config();

    tracing::info!(
        target: "sonar.paths",
        dataset = %dataset.display(),
        holdout = split.holdout_fraction,
        seed = split.seed,
        "Axum bootstrap resolved paths"
    );

    let (model, training) = tokio::task::spawn_blocking(move || {
        startup_model(&dataset, &split, &TrainingConfig::default())
    })
    .await?;

    let (controller, events) = AlertController::from_settings(settings);
    spawn_event_bridge(events);
    let alerts: Arc<dyn AlertPort> = Arc::new(controller);

    Ok(AxumContext::new(
        DetectionService::new(model, alerts),
        training,
    ))
}

/// Forward alert controller events into the log.
pub fn spawn_event_bridge(mut events: mpsc::UnboundedReceiver<AlertEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                AlertEvent::StateChanged(state) => {
                    tracing::info!(target: "sonar.alert", ?state, "Alert state changed");
                }
                AlertEvent::UtteranceStarted { seq } => {
                    tracing::debug!(target: "sonar.alert", seq, "Utterance started");
                }
                AlertEvent::UtteranceFinished { seq, interrupted } => {
                    tracing::debug!(target: "sonar.alert", seq, interrupted, "Utterance finished");
                }
                AlertEvent::Error(message) => {
                    tracing::warn!(target: "sonar.alert", %message, "Speech error");
                }
            }
        }
        tracing::debug!(target: "sonar.alert", "Alert event stream closed");
    })
}

/// Start the web server and run until Ctrl-C.
pub async fn start_server(config: ServerConfig, settings: &Settings) -> Result<()> {
    use tokio::net::TcpListener;
    use tracing::info;

    let ctx = bootstrap(settings).await?;
    let app = crate::routes::create_router(ctx);

    let listener = TcpListener::bind(config.address()).await?;
    info!("sonar web UI listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("sonar web UI stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
