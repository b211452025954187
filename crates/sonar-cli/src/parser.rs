//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;
use sonar_core::Settings;

use crate::commands::Commands;

/// Command-line interface for the sonar rock/mine detector.
///
/// Global options override the matching `SONAR_*` settings for this
/// invocation.
#[derive(Debug, Parser)]
#[command(name = "sonar")]
#[command(about = "Classify sonar returns as rock or mine, with spoken alerts")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Training dataset (CSV, 60 features + R/M label, no header)
    #[arg(long, global = true, env = "SONAR_DATASET")]
    pub dataset: Option<String>,

    /// Speech rate in words per minute
    #[arg(long = "speech-rate", global = true, env = "SONAR_SPEECH_RATE")]
    pub speech_rate: Option<u32>,

    /// Speech program to use instead of probing espeak-ng, espeak, say, spd-say
    #[arg(long = "speech-program", global = true, env = "SONAR_SPEECH_PROGRAM")]
    pub speech_program: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply flag values on top of `settings`.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(dataset) = &self.dataset {
            settings.dataset_path = Some(dataset.clone());
        }
        if let Some(rate) = self.speech_rate {
            settings.speech_rate = Some(rate);
        }
        if let Some(program) = &self.speech_program {
            settings.speech_program = Some(program.clone());
        }
        if let Commands::Serve {
            port: Some(port), ..
        } = &self.command
        {
            settings.server_port = Some(*port);
        }
    }
}
