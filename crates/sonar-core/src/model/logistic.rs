//! L2-regularised logistic regression, fitted by full-batch gradient descent.
//!
//! The objective matches the usual `C`-parameterised form:
//!
//! ```text
//!   0.5 * ||w||² + C * Σ logloss(yᵢ, σ(w·xᵢ + b))
//! ```
//!
//! scaled by `1 / (C * n)` so the learning rate does not depend on the
//! sample count. The intercept is not penalised. Mine is the positive class.

use serde::{Deserialize, Serialize};

use crate::dataset::Sample;
use crate::domain::{ObjectClass, SIGNAL_LEN, SignalVector};
use crate::ports::SignalClassifier;

/// Hyper-parameters for [`LogisticModel::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Inverse regularisation strength.
    pub c: f64,
    pub learning_rate: f64,
    pub max_iter: usize,
    /// Stop once the gradient norm falls below this.
    pub tolerance: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            learning_rate: 0.05,
            max_iter: 5000,
            tolerance: 1e-6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Cannot fit a model on an empty training set")]
    EmptyTrainingSet,

    #[error("Sample {index} has {found} features, expected {expected}")]
    FeatureCount {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid training config: {0}")]
    InvalidConfig(String),
}

/// A fitted binary classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    weights: Vec<f64>,
    intercept: f64,
    iterations: usize,
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn target(class: ObjectClass) -> f64 {
    if class.is_dangerous() { 1.0 } else { 0.0 }
}

impl LogisticModel {
    /// Fit a model on `samples`.
    pub fn fit(samples: &[Sample], config: &TrainingConfig) -> Result<Self, ModelError> {
        if samples.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if config.c <= 0.0 || config.learning_rate <= 0.0 || config.max_iter == 0 {
            return Err(ModelError::InvalidConfig(format!(
                "c={}, learning_rate={}, max_iter={}",
                config.c, config.learning_rate, config.max_iter
            )));
        }
        if let Some((index, sample)) = samples
            .iter()
            .enumerate()
            .find(|(_, s)| s.features.len() != SIGNAL_LEN)
        {
            return Err(ModelError::FeatureCount {
                index,
                expected: SIGNAL_LEN,
                found: sample.features.len(),
            });
        }

        let n = samples.len() as f64;
        let mut weights = vec![0.0; SIGNAL_LEN];
        let mut intercept = 0.0;
        let mut grad_w = vec![0.0; SIGNAL_LEN];
        let mut iterations = 0;

        while iterations < config.max_iter {
            iterations += 1;
            grad_w.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_b = 0.0;

            for sample in samples {
                let z = dot(&weights, &sample.features) + intercept;
                let residual = sigmoid(z) - target(sample.class);
                for (g, x) in grad_w.iter_mut().zip(&sample.features) {
                    *g += residual * x;
                }
                grad_b += residual;
            }

            let mut norm_sq = 0.0;
            for (g, w) in grad_w.iter_mut().zip(&weights) {
                *g = *g / n + w / (config.c * n);
                norm_sq += *g * *g;
            }
            grad_b /= n;
            norm_sq += grad_b * grad_b;

            if norm_sq.sqrt() < config.tolerance {
                break;
            }

            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= config.learning_rate * g;
            }
            intercept -= config.learning_rate * grad_b;
        }

        tracing::debug!(iterations, intercept, "Logistic regression fitted");

        Ok(Self {
            weights,
            intercept,
            iterations,
        })
    }

    /// Probability that `features` came from a mine.
    #[must_use]
    pub fn mine_probability(&self, features: &[f64]) -> f64 {
        sigmoid(dot(&self.weights, features) + self.intercept)
    }

    #[must_use]
    pub fn classify_features(&self, features: &[f64]) -> ObjectClass {
        if self.mine_probability(features) >= 0.5 {
            ObjectClass::Mine
        } else {
            ObjectClass::Rock
        }
    }

    /// Fraction of `samples` classified correctly. `None` for an empty slice.
    #[must_use]
    pub fn accuracy(&self, samples: &[Sample]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        let correct = samples
            .iter()
            .filter(|s| self.classify_features(&s.features) == s.class)
            .count();
        Some(correct as f64 / samples.len() as f64)
    }

    /// Gradient steps taken before convergence or `max_iter`.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl SignalClassifier for LogisticModel {
    fn predict(&self, signal: &SignalVector) -> ObjectClass {
        self.classify_features(signal.values())
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
