//! CLI-specific error types and mappings.
//!
//! This module provides the CLI error type and the mappings from core errors
//! to exit codes and user-facing messages.

use sonar_core::{DetectError, SettingsError, TrainingError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// The signal text did not parse.
    #[error("{0}")]
    Input(String),

    /// The dataset could not be read.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// No trained model.
    #[error("{0}")]
    ModelUnavailable(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (terminal input, socket bind).
    #[error("IO error: {0}")]
    Io(String),

    /// Web server failure.
    #[error("Server error: {0}")]
    Server(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Input(_) => 65,            // EX_DATAERR
            Self::Dataset(_) => 66,          // EX_NOINPUT
            Self::ModelUnavailable(_) => 69, // EX_UNAVAILABLE
            Self::Io(_) => 74,               // EX_IOERR
            Self::Config(_) => 78,           // EX_CONFIG
            Self::Server(_) | Self::Other(_) => 1,
        }
    }
}

impl From<DetectError> for CliError {
    fn from(err: DetectError) -> Self {
        match err {
            DetectError::Input(input) => Self::Input(input.to_string()),
            DetectError::ModelUnavailable(reason) => Self::ModelUnavailable(reason),
        }
    }
}

impl From<TrainingError> for CliError {
    fn from(err: TrainingError) -> Self {
        match err {
            TrainingError::Dataset(_) => Self::Dataset(err.to_string()),
            TrainingError::Model(model) => Self::Other(format!("Training failed: {model}")),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(format!("Failed to encode JSON: {err}"))
    }
}
