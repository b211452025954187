//! Settings domain types and validation.
//!
//! Settings come from `SONAR_*` environment variables (a `.env` file is
//! loaded by the CLI first) and are then overridden by command-line flags.
//! All fields are optional; the `effective_*` accessors apply defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::SplitConfig;

/// Default dataset file, relative to the working directory.
pub const DEFAULT_DATASET_PATH: &str = "data/sonar.csv";

/// Default HTTP port for `sonar serve`.
pub const DEFAULT_SERVER_PORT: u16 = 8501;

/// Default speech rate in words per minute.
pub const DEFAULT_SPEECH_RATE: u32 = 150;

/// Default pause between repeats of a continuous alert.
pub const DEFAULT_LOOP_PAUSE_MS: u64 = 300;

/// Application settings structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Path to the training CSV.
    pub dataset_path: Option<String>,

    /// Port for the web UI.
    pub server_port: Option<u16>,

    /// Speech rate in words per minute (80-450).
    pub speech_rate: Option<u32>,

    /// Explicit speech program (e.g. `espeak-ng`); probed when unset.
    pub speech_program: Option<String>,

    /// Pause between repeats of a continuous alert, in milliseconds.
    pub loop_pause_ms: Option<u64>,

    /// Fraction of the dataset held out from training (0.0-0.5).
    pub holdout_fraction: Option<f64>,

    /// Seed for the train/holdout shuffle.
    pub split_seed: Option<u64>,
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("Port should be >= 1024 (privileged ports require root), got {0}")]
    InvalidPort(u16),

    #[error("Speech rate must be between 80 and 450 words per minute, got {0}")]
    InvalidSpeechRate(u32),

    #[error("Holdout fraction must be between 0.0 and 0.5, got {0}")]
    InvalidHoldoutFraction(f64),

    #[error("Dataset path cannot be empty")]
    EmptyDatasetPath,

    #[error("Speech program cannot be empty")]
    EmptySpeechProgram,

    #[error("Environment variable {name} has an invalid value '{value}'")]
    InvalidEnvValue { name: &'static str, value: String },
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            dataset_path: Some(DEFAULT_DATASET_PATH.to_string()),
            server_port: Some(DEFAULT_SERVER_PORT),
            speech_rate: Some(DEFAULT_SPEECH_RATE),
            speech_program: None,
            loop_pause_ms: Some(DEFAULT_LOOP_PAUSE_MS),
            holdout_fraction: Some(0.1),
            split_seed: Some(1),
        }
    }

    /// Read `SONAR_*` variables through `lookup`.
    ///
    /// Unset variables leave the field `None`; malformed numbers are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            name: &'static str,
        ) -> Result<Option<T>, SettingsError> {
            lookup(name)
                .map(|value| {
                    value
                        .trim()
                        .parse::<T>()
                        .map_err(|_| SettingsError::InvalidEnvValue { name, value })
                })
                .transpose()
        }

        Ok(Self {
            dataset_path: lookup("SONAR_DATASET"),
            server_port: parsed(&lookup, "SONAR_PORT")?,
            speech_rate: parsed(&lookup, "SONAR_SPEECH_RATE")?,
            speech_program: lookup("SONAR_SPEECH_PROGRAM"),
            loop_pause_ms: parsed(&lookup, "SONAR_LOOP_PAUSE_MS")?,
            holdout_fraction: parsed(&lookup, "SONAR_HOLDOUT_FRACTION")?,
            split_seed: parsed(&lookup, "SONAR_SPLIT_SEED")?,
        })
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    #[must_use]
    pub fn effective_dataset_path(&self) -> PathBuf {
        PathBuf::from(
            self.dataset_path
                .as_deref()
                .unwrap_or(DEFAULT_DATASET_PATH),
        )
    }

    #[must_use]
    pub fn effective_server_port(&self) -> u16 {
        self.server_port.unwrap_or(DEFAULT_SERVER_PORT)
    }

    #[must_use]
    pub fn effective_speech_rate(&self) -> u32 {
        self.speech_rate.unwrap_or(DEFAULT_SPEECH_RATE)
    }

    #[must_use]
    pub fn effective_loop_pause(&self) -> Duration {
        Duration::from_millis(self.loop_pause_ms.unwrap_or(DEFAULT_LOOP_PAUSE_MS))
    }

    #[must_use]
    pub fn effective_holdout_fraction(&self) -> f64 {
        self.holdout_fraction.unwrap_or(0.1)
    }

    #[must_use]
    pub fn effective_split_seed(&self) -> u64 {
        self.split_seed.unwrap_or(1)
    }

    /// The train/holdout split these settings describe.
    #[must_use]
    pub fn split_config(&self) -> SplitConfig {
        SplitConfig {
            holdout_fraction: self.effective_holdout_fraction(),
            seed: self.effective_split_seed(),
        }
    }
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(port) = settings.server_port {
        if port < 1024 {
            return Err(SettingsError::InvalidPort(port));
        }
    }

    if let Some(rate) = settings.speech_rate {
        if !(80..=450).contains(&rate) {
            return Err(SettingsError::InvalidSpeechRate(rate));
        }
    }

    if let Some(fraction) = settings.holdout_fraction {
        if !(0.0..=0.5).contains(&fraction) {
            return Err(SettingsError::InvalidHoldoutFraction(fraction));
        }
    }

    if settings
        .dataset_path
        .as_ref()
        .is_some_and(|p| p.trim().is_empty())
    {
        return Err(SettingsError::EmptyDatasetPath);
    }

    if settings
        .speech_program
        .as_ref()
        .is_some_and(|p| p.trim().is_empty())
    {
        return Err(SettingsError::EmptySpeechProgram);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::with_defaults();
        assert_eq!(settings.effective_server_port(), DEFAULT_SERVER_PORT);
        assert_eq!(settings.effective_speech_rate(), 150);
        assert_eq!(
            settings.effective_dataset_path(),
            PathBuf::from(DEFAULT_DATASET_PATH)
        );
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.effective_loop_pause(), Duration::from_millis(300));
        assert!((settings.effective_holdout_fraction() - 0.1).abs() < f64::EPSILON);
        assert_eq!(settings.effective_split_seed(), 1);
        assert_eq!(settings.split_config(), SplitConfig::default());
    }

    #[test]
    fn test_from_lookup_reads_variables() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("SONAR_DATASET", "/tmp/sonar.csv"),
            ("SONAR_PORT", "9000"),
            ("SONAR_SPEECH_RATE", " 180 "),
            ("SONAR_SPEECH_PROGRAM", "espeak"),
        ]))
        .unwrap();

        assert_eq!(settings.dataset_path.as_deref(), Some("/tmp/sonar.csv"));
        assert_eq!(settings.server_port, Some(9000));
        assert_eq!(settings.speech_rate, Some(180));
        assert_eq!(settings.speech_program.as_deref(), Some("espeak"));
        assert_eq!(settings.loop_pause_ms, None);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let err = Settings::from_lookup(lookup_from(&[("SONAR_PORT", "eighty")])).unwrap_err();
        assert_eq!(
            err,
            SettingsError::InvalidEnvValue {
                name: "SONAR_PORT",
                value: "eighty".to_string()
            }
        );
    }

    #[test]
    fn test_validate_ranges() {
        let mut settings = Settings::with_defaults();
        settings.server_port = Some(80);
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidPort(80))
        ));

        let mut settings = Settings::with_defaults();
        settings.speech_rate = Some(1000);
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidSpeechRate(1000))
        ));

        let mut settings = Settings::with_defaults();
        settings.holdout_fraction = Some(0.9);
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidHoldoutFraction(_))
        ));
    }

    #[test]
    fn test_validate_empty_strings() {
        let mut settings = Settings::with_defaults();
        settings.dataset_path = Some("  ".to_string());
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::EmptyDatasetPath)
        );

        let mut settings = Settings::with_defaults();
        settings.speech_program = Some(String::new());
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::EmptySpeechProgram)
        );
    }

    #[test]
    fn test_settings_serialization() {
        let settings = Settings::with_defaults();
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, parsed);
    }
}
