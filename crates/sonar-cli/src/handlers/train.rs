//! Train command handler.

use sonar_core::{Settings, TrainingConfig, TrainingReport, train_from_csv};

use crate::error::CliError;

/// Train on the configured dataset and print the report.
pub fn execute(settings: &Settings, json: bool) -> Result<TrainingReport, CliError> {
    let dataset = settings.effective_dataset_path();
    let (_, report) = train_from_csv(
        &dataset,
        &settings.split_config(),
        &TrainingConfig::default(),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Dataset: {}", dataset.display());
        print!("{}", format_report(&report));
    }
    Ok(report)
}

/// Human-readable report.
pub fn format_report(report: &TrainingReport) -> String {
    let holdout = report
        .holdout_accuracy
        .map_or_else(|| "n/a".to_string(), |acc| format!("{:.1}%", acc * 100.0));
    format!(
        "Training samples:  {}\nHoldout samples:   {}\nTraining accuracy: {:.1}%\nHoldout accuracy:  {holdout}\nIterations:        {}\n",
        report.train_samples,
        report.holdout_samples,
        report.train_accuracy * 100.0,
        report.iterations,
    )
}
