//! The alert controller: owns the speech backend and at most one background
//! worker that repeats an announcement until stopped.
//!
//! # State machine
//!
//! ```text
//!   Idle ──start(Once)──► SpeakingOnce ──utterance ends──► Idle
//!    │ ▲
//!    │ └──── stop() / worker exits on error (reaped) ────┐
//!    └──────start(Continuous)──────────────────► SpeakingLoop
//! ```
//!
//! # Invariants
//!
//! - A worker thread is alive only while the state is `SpeakingLoop`, and
//!   there is never more than one.
//! - `start` runs a full `stop` (set the cancel flag, join the worker) before
//!   anything new is spoken.
//! - `start` and `stop` serialize on one operation lock. Status queries do
//!   not take it, so they never wait for an utterance.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use sonar_core::{
    AlertError, AlertMode, AlertPort, AlertReport, AlertState, AlertStatus, Settings,
};
use tokio::sync::mpsc;

use crate::backend::{self, SpeechBackend, SpeechConfig, UtteranceOutcome};
use crate::cancel::CancellationToken;
use crate::error::VoiceError;

/// Name given to the looping worker thread.
pub const ALERT_THREAD_NAME: &str = "sonar-alert";

// ── Events ─────────────────────────────────────────────────────────

/// Events emitted by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertEvent {
    StateChanged(AlertState),

    /// An utterance was handed to the backend. `seq` increases by one per
    /// utterance for the lifetime of the controller.
    UtteranceStarted { seq: u64 },

    UtteranceFinished { seq: u64, interrupted: bool },

    /// A speech runtime error. A looping worker exits after emitting this.
    Error(String),
}

// ── Config ─────────────────────────────────────────────────────────

/// Controller tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertConfig {
    /// Pause between repeats of a continuous alert.
    pub loop_pause: Duration,
}

impl AlertConfig {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            loop_pause: settings.effective_loop_pause(),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            loop_pause: Duration::from_millis(300),
        }
    }
}

// ── Shared pieces ──────────────────────────────────────────────────

type SharedBackend = Arc<Mutex<Box<dyn SpeechBackend>>>;

enum Speech {
    Ready { backend: SharedBackend, name: String },
    Unavailable(String),
}

struct Slot {
    state: AlertState,
    worker: Option<JoinHandle<()>>,
}

/// Everything the worker thread and the caller's thread both touch.
#[derive(Clone)]
struct Shared {
    cancel: CancellationToken,
    utterances: Arc<AtomicU64>,
    last_error: Arc<Mutex<Option<String>>>,
    event_tx: mpsc::UnboundedSender<AlertEvent>,
}

impl Shared {
    fn emit(&self, event: AlertEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!("Alert event receiver dropped");
        }
    }

    fn next_seq(&self) -> u64 {
        self.utterances.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn record_error(&self, message: &str) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(message.to_string());
        self.emit(AlertEvent::Error(message.to_string()));
    }

    /// One say-and-wait on the calling thread.
    fn utter(
        &self,
        backend: &SharedBackend,
        text: &str,
    ) -> (u64, Result<UtteranceOutcome, VoiceError>) {
        let mut backend = backend.lock().unwrap_or_else(PoisonError::into_inner);
        let seq = self.next_seq();
        self.emit(AlertEvent::UtteranceStarted { seq });

        let result = backend
            .say(text)
            .and_then(|()| backend.run_until_done(&self.cancel));

        if let Ok(outcome) = &result {
            self.emit(AlertEvent::UtteranceFinished {
                seq,
                interrupted: *outcome == UtteranceOutcome::Interrupted,
            });
        }
        (seq, result)
    }
}

// ── Controller ─────────────────────────────────────────────────────

/// Owns the speech backend and the continuous-alert worker.
///
/// Implements [`AlertPort`]. All methods block; async callers should use
/// `spawn_blocking`. Dropping the controller stops any running alert.
pub struct AlertController {
    speech: Speech,
    config: AlertConfig,
    shared: Shared,
    slot: Mutex<Slot>,
    ops: Mutex<()>,
    notice_pending: AtomicBool,
}

impl AlertController {
    /// Create a controller that speaks through `backend`.
    ///
    /// Returns the controller and a receiver for [`AlertEvent`]s.
    #[must_use]
    pub fn new(
        backend: Box<dyn SpeechBackend>,
        config: AlertConfig,
    ) -> (Self, mpsc::UnboundedReceiver<AlertEvent>) {
        let name = backend.name().to_string();
        tracing::info!(backend = %name, "Speech backend ready");
        Self::build(
            Speech::Ready {
                backend: Arc::new(Mutex::new(backend)),
                name,
            },
            config,
        )
    }

    /// Create a controller with no speech: every alert is a silent no-op.
    #[must_use]
    pub fn unavailable(
        reason: impl Into<String>,
        config: AlertConfig,
    ) -> (Self, mpsc::UnboundedReceiver<AlertEvent>) {
        let reason = reason.into();
        tracing::warn!(%reason, "Speech backend unavailable, alerts will be silent");
        Self::build(Speech::Unavailable(reason), config)
    }

    /// Create from the result of probing for a backend.
    #[must_use]
    pub fn from_probe(
        probe: Result<Box<dyn SpeechBackend>, VoiceError>,
        config: AlertConfig,
    ) -> (Self, mpsc::UnboundedReceiver<AlertEvent>) {
        match probe {
            Ok(backend) => Self::new(backend, config),
            Err(VoiceError::BackendUnavailable(reason)) => Self::unavailable(reason, config),
            Err(e) => Self::unavailable(e.to_string(), config),
        }
    }

    /// Probe for a speech backend as configured by `settings`.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> (Self, mpsc::UnboundedReceiver<AlertEvent>) {
        let probe = backend::detect(&SpeechConfig::from_settings(settings));
        Self::from_probe(probe, AlertConfig::from_settings(settings))
    }

    fn build(speech: Speech, config: AlertConfig) -> (Self, mpsc::UnboundedReceiver<AlertEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let notice_pending = matches!(speech, Speech::Unavailable(_));
        let controller = Self {
            speech,
            config,
            shared: Shared {
                cancel: CancellationToken::new(),
                utterances: Arc::new(AtomicU64::new(0)),
                last_error: Arc::new(Mutex::new(None)),
                event_tx,
            },
            slot: Mutex::new(Slot {
                state: AlertState::Idle,
                worker: None,
            }),
            ops: Mutex::new(()),
            notice_pending: AtomicBool::new(notice_pending),
        };
        (controller, event_rx)
    }

    /// Current state, after reaping a worker that exited on its own.
    pub fn state(&self) -> AlertState {
        self.lock_slot().state
    }

    /// Whether a background worker is currently held.
    pub fn has_worker(&self) -> bool {
        self.lock_slot().worker.is_some()
    }

    pub fn backend_name(&self) -> Option<&str> {
        match &self.speech {
            Speech::Ready { name, .. } => Some(name),
            Speech::Unavailable(_) => None,
        }
    }

    // ── Internals ──────────────────────────────────────────────────

    /// Lock the state slot, reaping a finished worker first.
    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.worker.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(worker) = slot.worker.take() {
                if worker.join().is_err() {
                    tracing::error!("Alert worker panicked");
                }
            }
            tracing::debug!("Reaped alert worker that exited on its own");
            self.set_state(&mut slot, AlertState::Idle);
        }
        slot
    }

    fn set_state(&self, slot: &mut Slot, state: AlertState) {
        if slot.state != state {
            tracing::debug!(from = ?slot.state, to = ?state, "Alert state change");
            slot.state = state;
            self.shared.emit(AlertEvent::StateChanged(state));
        }
    }

    /// `stop` body; the caller holds the operation lock.
    fn stop_locked(&self) {
        self.shared.cancel.cancel();

        // Take the handle out before joining so status queries stay live.
        let worker = self.lock_slot().worker.take();
        if let Some(worker) = worker {
            tracing::debug!("Waiting for alert worker to exit");
            if worker.join().is_err() {
                tracing::error!("Alert worker panicked");
            }
        }

        let mut slot = self.lock_slot();
        self.set_state(&mut slot, AlertState::Idle);
    }

    fn speak_once(&self, backend: &SharedBackend, text: &str) -> AlertReport {
        {
            let mut slot = self.lock_slot();
            self.set_state(&mut slot, AlertState::SpeakingOnce);
        }

        let (seq, result) = self.shared.utter(backend, text);

        {
            let mut slot = self.lock_slot();
            self.set_state(&mut slot, AlertState::Idle);
        }

        match result {
            Ok(_) => AlertReport::Spoken { utterance: seq },
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(error = %message, "Speech failed");
                self.shared.record_error(&message);
                AlertReport::SpeechFailed { message }
            }
        }
    }

    fn spawn_loop(&self, backend: &SharedBackend, text: &str) -> Result<AlertReport, AlertError> {
        let shared = self.shared.clone();
        let backend = Arc::clone(backend);
        let text = text.to_string();
        let pause = self.config.loop_pause;

        // The state change is published before the worker can emit anything.
        let mut slot = self.lock_slot();
        self.set_state(&mut slot, AlertState::SpeakingLoop);

        match thread::Builder::new()
            .name(ALERT_THREAD_NAME.into())
            .spawn(move || run_loop(&shared, &backend, &text, pause))
        {
            Ok(worker) => {
                slot.worker = Some(worker);
                tracing::info!("Continuous alert started");
                Ok(AlertReport::LoopStarted)
            }
            Err(e) => {
                self.set_state(&mut slot, AlertState::Idle);
                Err(AlertError::WorkerSpawn(e.to_string()))
            }
        }
    }
}

/// Worker body: repeat until cancelled or the backend fails.
fn run_loop(shared: &Shared, backend: &SharedBackend, text: &str, pause: Duration) {
    tracing::debug!("Alert worker running");
    loop {
        if shared.cancel.is_cancelled() {
            break;
        }

        match shared.utter(backend, text) {
            (_, Ok(UtteranceOutcome::Completed)) => {}
            (_, Ok(UtteranceOutcome::Interrupted)) => break,
            (seq, Err(e)) => {
                let message = e.to_string();
                tracing::warn!(seq, error = %message, "Speech failed, ending continuous alert");
                shared.record_error(&message);
                break;
            }
        }

        if shared.cancel.wait_for(pause) {
            break;
        }
    }
    tracing::debug!("Alert worker exiting");
}

impl AlertPort for AlertController {
    fn start(&self, text: &str, mode: AlertMode) -> Result<AlertReport, AlertError> {
        if text.trim().is_empty() {
            return Err(AlertError::EmptyText);
        }

        let _op = self.ops.lock().unwrap_or_else(PoisonError::into_inner);
        self.stop_locked();
        self.shared.cancel.reset();

        let backend = match &self.speech {
            Speech::Ready { backend, .. } => backend,
            Speech::Unavailable(reason) => {
                tracing::debug!(%text, "Speech unavailable, alert muted");
                return Ok(AlertReport::Muted {
                    reason: reason.clone(),
                });
            }
        };

        tracing::info!(%text, ?mode, "Alert requested");
        match mode {
            AlertMode::Once => Ok(self.speak_once(backend, text)),
            AlertMode::Continuous => self.spawn_loop(backend, text),
        }
    }

    fn stop(&self) {
        // Cut an in-flight single utterance short before queueing for the lock.
        self.shared.cancel.cancel();
        let _op = self.ops.lock().unwrap_or_else(PoisonError::into_inner);
        self.stop_locked();
    }

    fn status(&self) -> AlertStatus {
        let state = self.state();
        let (backend, unavailable_reason) = match &self.speech {
            Speech::Ready { name, .. } => (Some(name.clone()), None),
            Speech::Unavailable(reason) => (None, Some(reason.clone())),
        };
        AlertStatus {
            state,
            utterances: self.shared.utterances.load(Ordering::SeqCst),
            backend,
            unavailable_reason,
            last_error: self
                .shared
                .last_error
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    fn take_unavailable_notice(&self) -> Option<String> {
        match &self.speech {
            Speech::Unavailable(reason) if self.notice_pending.swap(false, Ordering::SeqCst) => {
                Some(reason.clone())
            }
            _ => None,
        }
    }
}

impl Drop for AlertController {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for AlertController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertController")
            .field("backend", &self.backend_name())
            .field("state", &self.state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Completes every utterance instantly.
    struct InstantBackend;

    impl SpeechBackend for InstantBackend {
        fn name(&self) -> &str {
            "instant"
        }

        fn say(&mut self, _text: &str) -> Result<(), VoiceError> {
            Ok(())
        }

        fn run_until_done(
            &mut self,
            _cancel: &CancellationToken,
        ) -> Result<UtteranceOutcome, VoiceError> {
            Ok(UtteranceOutcome::Completed)
        }
    }

    #[test]
    fn new_controller_is_idle() {
        let (controller, _rx) = AlertController::new(Box::new(InstantBackend), AlertConfig::default());
        assert_eq!(controller.state(), AlertState::Idle);
        assert_eq!(controller.backend_name(), Some("instant"));
        assert!(!controller.has_worker());
        assert_eq!(controller.take_unavailable_notice(), None);
    }

    #[test]
    fn config_follows_settings() {
        let settings = Settings {
            loop_pause_ms: Some(40),
            ..Settings::default()
        };
        assert_eq!(
            AlertConfig::from_settings(&settings).loop_pause,
            Duration::from_millis(40)
        );
        assert_eq!(
            AlertConfig::default().loop_pause,
            Settings::default().effective_loop_pause()
        );
    }

    #[test]
    fn probe_failure_makes_a_silent_controller() {
        let (controller, _rx) = AlertController::from_probe(
            Err(VoiceError::BackendUnavailable("no espeak".to_string())),
            AlertConfig::default(),
        );
        let status = controller.status();
        assert_eq!(status.backend, None);
        assert_eq!(status.unavailable_reason.as_deref(), Some("no espeak"));
    }

    #[test]
    fn once_emits_state_and_utterance_events() {
        let (controller, mut rx) =
            AlertController::new(Box::new(InstantBackend), AlertConfig::default());
        let report = controller.start("The Object is rock", AlertMode::Once).unwrap();
        assert_eq!(report, AlertReport::Spoken { utterance: 1 });

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                AlertEvent::StateChanged(AlertState::SpeakingOnce),
                AlertEvent::UtteranceStarted { seq: 1 },
                AlertEvent::UtteranceFinished {
                    seq: 1,
                    interrupted: false
                },
                AlertEvent::StateChanged(AlertState::Idle),
            ]
        );
    }
}
