//! Detect command handler.
//!
//! Classifies one signal and announces it. A rock is spoken once before the
//! command returns. A mine starts the continuous alert, which `--hold` keeps
//! sounding until Enter is pressed; without it the alert is stopped on exit.

use std::io::BufRead;

use sonar_core::{AlertReport, Detection};

use crate::bootstrap::CliContext;
use crate::error::CliError;

pub fn execute(
    ctx: &CliContext,
    signal: &str,
    hold: bool,
    json: bool,
) -> Result<Detection, CliError> {
    let detection = ctx.detection.detect(signal)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detection)?);
    } else {
        println!("{}", detection.headline);
    }
    // A muted alert is already logged by the service.
    if let AlertReport::SpeechFailed { .. } = detection.alert {
        if let Some(problem) = detection.alert.problem() {
            eprintln!("{problem}");
        }
    }

    if detection.alert == AlertReport::LoopStarted {
        if hold {
            eprintln!("Alert sounding. Press Enter to stop.");
            wait_for_enter()?;
        } else {
            tracing::debug!("Stopping continuous alert on exit (use --hold to keep it)");
        }
        ctx.detection.stop_alert();
        eprintln!("Alert stopped.");
    }

    Ok(detection)
}

fn wait_for_enter() -> Result<(), CliError> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(())
}
