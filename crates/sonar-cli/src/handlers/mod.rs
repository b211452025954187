//! Command handlers.
//!
//! Handlers follow one pattern: take the composed context (or settings),
//! call into `sonar-core`/`sonar-voice`, and format the result for the
//! terminal. No business logic lives here.

pub mod detect;
pub mod serve;
pub mod speak;
pub mod train;

use crate::bootstrap::{SpeechMode, bootstrap, load_settings};
use crate::commands::Commands;
use crate::error::CliError;
use crate::parser::Cli;

/// Route a parsed command line to its handler.
pub async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(&cli)?;

    match cli.command {
        Commands::Serve { host, .. } => serve::execute(&settings, &host).await,
        Commands::Detect {
            signal,
            mute,
            hold,
            json,
        } => {
            let speech = if mute {
                SpeechMode::Muted
            } else {
                SpeechMode::System
            };
            let ctx = bootstrap(settings, speech);
            detect::execute(&ctx, &signal, hold, json).map(|_| ())
        }
        Commands::Train { json } => train::execute(&settings, json).map(|_| ()),
        Commands::Speak {
            text,
            continuous,
            seconds,
        } => speak::execute(&settings, &text, continuous, seconds),
    }
}
