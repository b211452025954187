#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

pub mod alert;
pub mod backend;
pub mod cancel;
pub mod error;

pub use alert::{ALERT_THREAD_NAME, AlertConfig, AlertController, AlertEvent};
#[cfg(feature = "tts")]
pub use backend::TtsCrateBackend;
pub use backend::{
    CommandSpeechBackend, SpeechBackend, SpeechConfig, SpeechProgram, UtteranceOutcome, detect,
};
pub use cancel::CancellationToken;
pub use error::VoiceError;
