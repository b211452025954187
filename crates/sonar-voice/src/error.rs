//! Speech error types.

/// Errors raised by a speech backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoiceError {
    /// No usable speech program was found at start-up.
    #[error("No speech backend available: {0}")]
    BackendUnavailable(String),

    /// The speech program could not be launched.
    #[error("Failed to launch speech program: {0}")]
    SpawnFailed(String),

    /// The speech program ran but failed.
    #[error("Speech synthesis failed: {0}")]
    SynthesisError(String),
}
