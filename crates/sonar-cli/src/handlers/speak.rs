//! Speak command handler: drive the speech backend directly.

use std::thread;
use std::time::Duration;

use sonar_core::{AlertMode, AlertPort, AlertReport, Settings};

use crate::bootstrap::{SpeechMode, alert_controller};
use crate::error::CliError;

/// Say `text` once, or repeat it for `seconds` when `continuous`.
pub fn execute(
    settings: &Settings,
    text: &str,
    continuous: bool,
    seconds: u64,
) -> Result<(), CliError> {
    let controller = alert_controller(settings, SpeechMode::System);
    let mode = if continuous {
        AlertMode::Continuous
    } else {
        AlertMode::Once
    };

    let report = controller
        .start(text, mode)
        .map_err(|e| CliError::Other(e.to_string()))?;

    match &report {
        AlertReport::Muted { reason } => {
            return Err(CliError::Other(format!("Speech unavailable: {reason}")));
        }
        AlertReport::SpeechFailed { message } => {
            return Err(CliError::Other(format!("Error during speech: {message}")));
        }
        AlertReport::LoopStarted => {
            thread::sleep(Duration::from_secs(seconds));
            controller.stop();
        }
        AlertReport::Spoken { .. } => {}
    }

    let status = controller.status();
    println!(
        "Spoke {} utterance(s) with {}",
        status.utterances,
        status.backend.as_deref().unwrap_or("no backend")
    );
    if let Some(error) = status.last_error {
        eprintln!("Last speech error: {error}");
    }
    Ok(())
}
