//! The rock/mine classifier.

pub mod logistic;
pub mod training;

pub use logistic::{LogisticModel, ModelError, TrainingConfig};
pub use training::{
    SplitConfig, TrainingError, TrainingReport, startup_model, train_from_csv, train_on_samples,
};
