//! Serve command handler: run the web UI until Ctrl-C.

use sonar_axum::{ServerConfig, start_server};
use sonar_core::Settings;

use crate::error::CliError;

pub async fn execute(settings: &Settings, host: &str) -> Result<(), CliError> {
    let config = ServerConfig::from_settings(settings).with_host(host);
    tracing::info!(address = %config.address(), "Starting web UI");

    start_server(config, settings)
        .await
        .map_err(|e| CliError::Server(format!("{e:#}")))
}
