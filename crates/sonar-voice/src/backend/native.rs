//! Speech through the operating system's own engine, via the [`tts`] crate
//! (Speech Dispatcher on Linux, AVFoundation on macOS, SAPI/WinRT on
//! Windows).
//!
//! The crate's `speak` returns as soon as the utterance is queued, so
//! waiting polls `is_speaking()` against the cancellation token and calls
//! `stop()` when cancelled.

use std::time::{Duration, Instant};

use tts::Tts;

use super::{SpeechBackend, SpeechConfig, UtteranceOutcome};
use crate::cancel::CancellationToken;
use crate::error::VoiceError;

/// How often the engine is asked whether it is still speaking.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long a queued utterance may take to start before it counts as done.
const START_GRACE: Duration = Duration::from_millis(500);

/// Words per minute that map to the engine's normal rate.
const NORMAL_WPM: f32 = 150.0;

/// [`SpeechBackend`] over the platform speech engine.
pub struct TtsCrateBackend {
    tts: Tts,
    pending: bool,
}

impl TtsCrateBackend {
    /// Open the platform engine and apply the configured rate.
    ///
    /// Fails with `BackendUnavailable` when there is no engine, or when the
    /// engine cannot report whether it is speaking (waiting would be
    /// impossible).
    pub fn new(config: &SpeechConfig) -> Result<Self, VoiceError> {
        let mut tts = Tts::default()
            .map_err(|e| VoiceError::BackendUnavailable(format!("native speech engine: {e}")))?;

        let features = tts.supported_features();
        if !features.is_speaking {
            return Err(VoiceError::BackendUnavailable(
                "native speech engine cannot report when it is speaking".to_string(),
            ));
        }

        if features.rate {
            let rate = engine_rate(
                config.rate,
                tts.min_rate(),
                tts.normal_rate(),
                tts.max_rate(),
            );
            if let Err(e) = tts.set_rate(rate) {
                tracing::warn!(error = %e, rate, "Could not set native speech rate");
            }
        }

        tracing::debug!("Native speech engine ready");
        Ok(Self {
            tts,
            pending: false,
        })
    }

    fn is_speaking(&self) -> Result<bool, VoiceError> {
        self.tts
            .is_speaking()
            .map_err(|e| VoiceError::SynthesisError(e.to_string()))
    }

    fn interrupt(&mut self) {
        if let Err(e) = self.tts.stop() {
            tracing::warn!(error = %e, "Native speech engine refused to stop");
        }
    }
}

/// Scale words per minute onto the engine's own rate range.
fn engine_rate(wpm: u32, min: f32, normal: f32, max: f32) -> f32 {
    (normal * wpm as f32 / NORMAL_WPM).clamp(min, max)
}

impl SpeechBackend for TtsCrateBackend {
    fn name(&self) -> &str {
        "native"
    }

    fn say(&mut self, text: &str) -> Result<(), VoiceError> {
        self.tts
            .speak(text, true)
            .map_err(|e| VoiceError::SynthesisError(e.to_string()))?;
        self.pending = true;
        Ok(())
    }

    fn run_until_done(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<UtteranceOutcome, VoiceError> {
        if !std::mem::take(&mut self.pending) {
            return Ok(UtteranceOutcome::Completed);
        }

        // Queued speech may not have begun yet.
        let deadline = Instant::now() + START_GRACE;
        while !self.is_speaking()? && Instant::now() < deadline {
            if cancel.wait_for(POLL_INTERVAL) {
                self.interrupt();
                return Ok(UtteranceOutcome::Interrupted);
            }
        }

        while self.is_speaking()? {
            if cancel.wait_for(POLL_INTERVAL) {
                self.interrupt();
                tracing::debug!("Utterance interrupted");
                return Ok(UtteranceOutcome::Interrupted);
            }
        }
        Ok(UtteranceOutcome::Completed)
    }
}

impl Drop for TtsCrateBackend {
    fn drop(&mut self) {
        if self.pending || self.is_speaking().unwrap_or(false) {
            self.interrupt();
        }
    }
}

impl std::fmt::Debug for TtsCrateBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtsCrateBackend")
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
