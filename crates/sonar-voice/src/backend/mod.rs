//! Speech backend trait: an engine-agnostic interface for saying one
//! utterance and waiting for it to finish.
//!
//! The [`AlertController`](crate::alert::AlertController) owns a
//! `Box<dyn SpeechBackend>` so that engines can be swapped (or mocked in
//! tests) without touching the alert state machine.
//!
//! ## Backend implementations
//!
//! | Module      | Engine | Feature |
//! |-------------|--------|---------|
//! | `native`    | Platform speech engine via the `tts` crate | `tts` |
//! | [`command`] | `espeak-ng`, `espeak`, `say` or `spd-say` run as a child process | always |
//!
//! [`detect`] prefers the native engine when it is compiled in and no
//! speech program was named explicitly, and falls back to the command
//! backend.

pub mod command;
#[cfg(feature = "tts")]
pub mod native;

pub use command::{CommandSpeechBackend, SpeechProgram};
#[cfg(feature = "tts")]
pub use native::TtsCrateBackend;

use sonar_core::{DEFAULT_SPEECH_RATE, Settings};

use crate::cancel::CancellationToken;
use crate::error::VoiceError;

// ── Shared types ───────────────────────────────────────────────────

/// How a wait for an utterance ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceOutcome {
    /// The engine finished speaking.
    Completed,

    /// The wait was cut short by cancellation.
    Interrupted,
}

/// Speech engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechConfig {
    /// Words per minute.
    pub rate: u32,

    /// Program to run instead of probing the usual candidates.
    pub program: Option<String>,
}

impl SpeechConfig {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            rate: settings.effective_speech_rate(),
            program: settings.speech_program.clone(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate: DEFAULT_SPEECH_RATE,
            program: None,
        }
    }
}

// ── Backend trait ──────────────────────────────────────────────────

/// Backend-agnostic text-to-speech engine.
///
/// Only `Send` is required: the controller keeps the backend behind a
/// mutex and at most one thread drives it at a time.
pub trait SpeechBackend: Send {
    /// Short engine name for logs and status output.
    fn name(&self) -> &str;

    /// Begin speaking `text`. Any utterance still in progress is abandoned.
    fn say(&mut self, text: &str) -> Result<(), VoiceError>;

    /// Block until the current utterance ends or `cancel` is set.
    ///
    /// Returns `Completed` immediately when nothing is being spoken.
    fn run_until_done(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<UtteranceOutcome, VoiceError>;
}

// ── Probing ────────────────────────────────────────────────────────

/// Pick a speech backend for `config`.
pub fn detect(config: &SpeechConfig) -> Result<Box<dyn SpeechBackend>, VoiceError> {
    #[cfg(feature = "tts")]
    if config.program.is_none() {
        match native::TtsCrateBackend::new(config) {
            Ok(backend) => return Ok(Box::new(backend)),
            Err(e) => {
                tracing::info!(error = %e, "Native speech engine unavailable, trying speech programs");
            }
        }
    }

    CommandSpeechBackend::detect(config).map(|backend| Box::new(backend) as Box<dyn SpeechBackend>)
}
