//! Sonar training data: loading and splitting.
//!
//! The file is a headerless CSV with one sweep per row: [`SIGNAL_LEN`]
//! numeric columns followed by the `R`/`M` label.

use std::io::Read;
use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::domain::{ObjectClass, SIGNAL_LEN};

/// Columns per row: the features plus the label.
pub const DATASET_COLUMNS: usize = SIGNAL_LEN + 1;

/// One labelled sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub features: Vec<f64>,
    pub class: ObjectClass,
}

/// Errors raised while reading a dataset. Row numbers are 1-based.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row}: expected {expected} columns, found {found}")]
    WrongColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {row}, column {column}: '{value}' is not a number")]
    BadValue {
        row: usize,
        column: usize,
        value: String,
    },

    #[error("Row {row}: unknown label '{label}' (expected R or M)")]
    UnknownLabel { row: usize, label: String },

    #[error("Dataset is empty")]
    Empty,

    #[error("Dataset only contains {0} samples; both classes are required")]
    SingleClass(ObjectClass),
}

/// Load a dataset from disk.
pub fn load_dataset(path: &Path) -> Result<Vec<Sample>, DatasetError> {
    let file = std::fs::File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let samples = read_dataset(file)?;
    tracing::debug!(path = %path.display(), rows = samples.len(), "Loaded sonar dataset");
    Ok(samples)
}

/// Parse a dataset from any reader.
pub fn read_dataset<R: Read>(reader: R) -> Result<Vec<Sample>, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = index + 1;

        if record.len() != DATASET_COLUMNS {
            return Err(DatasetError::WrongColumnCount {
                row,
                expected: DATASET_COLUMNS,
                found: record.len(),
            });
        }

        let mut features = Vec::with_capacity(SIGNAL_LEN);
        for (column, field) in record.iter().take(SIGNAL_LEN).enumerate() {
            let value = field
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| DatasetError::BadValue {
                    row,
                    column: column + 1,
                    value: field.to_string(),
                })?;
            features.push(value);
        }

        let label = &record[SIGNAL_LEN];
        let class = ObjectClass::from_label(label).ok_or_else(|| DatasetError::UnknownLabel {
            row,
            label: label.to_string(),
        })?;

        samples.push(Sample { features, class });
    }

    check_classes(&samples)?;
    Ok(samples)
}

fn check_classes(samples: &[Sample]) -> Result<(), DatasetError> {
    let Some(first) = samples.first() else {
        return Err(DatasetError::Empty);
    };
    if samples.iter().all(|s| s.class == first.class) {
        return Err(DatasetError::SingleClass(first.class));
    }
    Ok(())
}

/// Stratified train/holdout split.
///
/// Each class contributes `round(count * holdout_fraction)` samples to the
/// holdout set, chosen by a seeded shuffle so the split is reproducible.
/// Returns `(train, holdout)`.
#[must_use]
pub fn stratified_split(
    samples: &[Sample],
    holdout_fraction: f64,
    seed: u64,
) -> (Vec<Sample>, Vec<Sample>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let fraction = holdout_fraction.clamp(0.0, 1.0);

    let mut train = Vec::with_capacity(samples.len());
    let mut holdout = Vec::new();

    for class in [ObjectClass::Mine, ObjectClass::Rock] {
        let mut members: Vec<&Sample> = samples.iter().filter(|s| s.class == class).collect();
        members.shuffle(&mut rng);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let holdout_count = ((members.len() as f64) * fraction).round() as usize;

        let (held, kept) = members.split_at(holdout_count.min(members.len()));
        holdout.extend(held.iter().map(|s| (*s).clone()));
        train.extend(kept.iter().map(|s| (*s).clone()));
    }

    (train, holdout)
}
