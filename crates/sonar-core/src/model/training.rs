//! Startup training: load the dataset, split it, fit, and report.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dataset::{DatasetError, Sample, load_dataset, stratified_split};
use crate::model::logistic::{LogisticModel, ModelError, TrainingConfig};
use crate::ports::ModelHandle;

/// How the dataset is split before fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    pub holdout_fraction: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            holdout_fraction: 0.1,
            seed: 1,
        }
    }
}

/// Summary of a training run, shown by `sonar train` and `/api/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    pub train_samples: usize,
    pub holdout_samples: usize,
    pub train_accuracy: f64,
    /// `None` when the holdout fraction leaves no samples.
    pub holdout_accuracy: Option<f64>,
    pub iterations: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Split `samples` and fit a model on the training part.
pub fn train_on_samples(
    samples: &[Sample],
    split: &SplitConfig,
    config: &TrainingConfig,
) -> Result<(LogisticModel, TrainingReport), TrainingError> {
    let (train, holdout) = stratified_split(samples, split.holdout_fraction, split.seed);
    let model = LogisticModel::fit(&train, config)?;

    let report = TrainingReport {
        train_samples: train.len(),
        holdout_samples: holdout.len(),
        train_accuracy: model.accuracy(&train).unwrap_or_default(),
        holdout_accuracy: model.accuracy(&holdout),
        iterations: model.iterations(),
    };

    tracing::info!(
        train = report.train_samples,
        holdout = report.holdout_samples,
        train_accuracy = report.train_accuracy,
        holdout_accuracy = ?report.holdout_accuracy,
        iterations = report.iterations,
        "Sonar model trained"
    );

    Ok((model, report))
}

/// Load the CSV at `path` and train on it.
pub fn train_from_csv(
    path: &Path,
    split: &SplitConfig,
    config: &TrainingConfig,
) -> Result<(LogisticModel, TrainingReport), TrainingError> {
    let samples = load_dataset(path)?;
    train_on_samples(&samples, split, config)
}

/// Train once at startup.
///
/// Failure is not fatal: the handle comes back `Unavailable` with a message
/// for the UI, and the report is `None`.
pub fn startup_model(
    path: &Path,
    split: &SplitConfig,
    config: &TrainingConfig,
) -> (ModelHandle, Option<TrainingReport>) {
    match train_from_csv(path, split, config) {
        Ok((model, report)) => (ModelHandle::Ready(Arc::new(model)), Some(report)),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Model training failed");
            (
                ModelHandle::Unavailable(format!("Model loading failed: {e}")),
                None,
            )
        }
    }
}
