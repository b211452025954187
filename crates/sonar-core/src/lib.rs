#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod dataset;
pub mod domain;
pub mod model;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use dataset::{DatasetError, Sample, load_dataset, read_dataset, stratified_split};
pub use domain::{
    AlertMode, AlertState, InputError, ObjectClass, SIGNAL_LEN, SignalVector, parse_signal,
};
pub use model::{
    LogisticModel, ModelError, SplitConfig, TrainingConfig, TrainingError, TrainingReport,
    startup_model, train_from_csv, train_on_samples,
};
pub use ports::{AlertError, AlertPort, AlertReport, AlertStatus, ModelHandle, SignalClassifier};
pub use services::{DetectError, Detection, DetectionService};
pub use settings::{
    DEFAULT_DATASET_PATH, DEFAULT_SERVER_PORT, DEFAULT_SPEECH_RATE, Settings, SettingsError,
    validate_settings,
};

// Dev-dependencies used only by integration tests
#[cfg(test)]
use tempfile as _;
