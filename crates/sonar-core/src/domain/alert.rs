//! Alert state machine vocabulary.
//!
//! ```text
//!            start(once)              utterance done
//!   Idle ─────────────────► SpeakingOnce ───────────────► Idle
//!    │ ▲
//!    │ │ stop() / worker exit
//!    │ └──────────────────────────────┐
//!    │       start(continuous)        │
//!    └─────────────────────────► SpeakingLoop
//! ```
//!
//! A background worker exists exactly while the state is `SpeakingLoop`.

use serde::{Deserialize, Serialize};

/// Current state of the alert controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertState {
    /// Nothing is being announced.
    #[default]
    Idle,

    /// A single utterance is playing on the caller's thread.
    SpeakingOnce,

    /// The background worker is repeating the announcement.
    SpeakingLoop,
}

/// How an announcement should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertMode {
    /// One utterance, synchronously.
    #[default]
    Once,

    /// Repeat until stopped, on a background worker.
    Continuous,
}

impl AlertMode {
    #[must_use]
    pub const fn is_continuous(self) -> bool {
        matches!(self, Self::Continuous)
    }
}
