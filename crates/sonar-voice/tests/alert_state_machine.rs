//! Integration tests for the `AlertController` state machine.
//!
//! These tests drive the controller through its transitions using scripted
//! speech backends. No speech program is run; the mocks "speak" by waiting
//! on the cancellation token for a configurable time.
//!
//! # What is tested
//!
//! - Single utterances run synchronously and leave the controller idle
//! - Continuous alerts run on one worker thread until `stop`
//! - `stop` on an idle controller returns promptly
//! - A single alert after a continuous one retires the worker first
//! - A backend error ends the loop and is reaped to `Idle`
//! - An unavailable backend mutes alerts and reports the reason once
//! - Empty text is rejected without touching state

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use sonar_core::{AlertError, AlertMode, AlertPort, AlertReport, AlertState};
use sonar_voice::{
    ALERT_THREAD_NAME, AlertConfig, AlertController, AlertEvent, CancellationToken,
    SpeechBackend, UtteranceOutcome, VoiceError,
};
use tokio::sync::mpsc::UnboundedReceiver;

// ── Mock backend ───────────────────────────────────────────────────

/// One recorded utterance.
#[derive(Debug, Clone)]
struct Spoken {
    text: String,
    thread: ThreadId,
    thread_name: Option<String>,
}

/// A backend whose utterances take `hold` and can fail on demand.
struct ScriptedBackend {
    hold: Duration,
    /// Fail the n-th utterance (1-based).
    fail_on: Option<usize>,
    said: Arc<AtomicUsize>,
    log: Arc<Mutex<Vec<Spoken>>>,
    pending: bool,
}

impl ScriptedBackend {
    fn new(hold: Duration) -> Self {
        Self {
            hold,
            fail_on: None,
            said: Arc::new(AtomicUsize::new(0)),
            log: Arc::new(Mutex::new(Vec::new())),
            pending: false,
        }
    }

    fn failing_on(mut self, n: usize) -> Self {
        self.fail_on = Some(n);
        self
    }

    fn log(&self) -> Arc<Mutex<Vec<Spoken>>> {
        Arc::clone(&self.log)
    }
}

impl SpeechBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn say(&mut self, text: &str) -> Result<(), VoiceError> {
        let current = thread::current();
        self.log.lock().unwrap().push(Spoken {
            text: text.to_string(),
            thread: current.id(),
            thread_name: current.name().map(str::to_string),
        });
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
        let n = self.said.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(n) {
            return Err(VoiceError::SynthesisError("audio device lost".to_string()));
        }
        if cancel.wait_for(self.hold) {
            Ok(UtteranceOutcome::Interrupted)
        } else {
            Ok(UtteranceOutcome::Completed)
        }
    }
}

// ── Helpers ────────────────────────────────────────────────────────

fn fast_config() -> AlertConfig {
    AlertConfig {
        loop_pause: Duration::from_millis(5),
    }
}

fn controller_with(backend: ScriptedBackend) -> (AlertController, UnboundedReceiver<AlertEvent>) {
    AlertController::new(Box::new(backend), fast_config())
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

fn drain(rx: &mut UnboundedReceiver<AlertEvent>) -> Vec<AlertEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Every `UtteranceStarted` is closed before the next one opens.
fn assert_no_interleaving(events: &[AlertEvent]) {
    let mut open: Option<u64> = None;
    let mut last_seq = 0;
    for event in events {
        match event {
            AlertEvent::UtteranceStarted { seq } => {
                assert_eq!(open, None, "utterance {seq} started while another was open");
                assert!(*seq > last_seq, "sequence ids must increase");
                last_seq = *seq;
                open = Some(*seq);
            }
            AlertEvent::UtteranceFinished { seq, .. } => {
                assert_eq!(open, Some(*seq), "finished an utterance that was not open");
                open = None;
            }
            AlertEvent::Error(_) => open = None,
            AlertEvent::StateChanged(_) => {}
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[test]
fn once_speaks_on_the_calling_thread() {
    let backend = ScriptedBackend::new(Duration::from_millis(10));
    let log = backend.log();
    let (controller, _rx) = controller_with(backend);

    let report = controller
        .start("The Object is rock", AlertMode::Once)
        .unwrap();

    assert_eq!(report, AlertReport::Spoken { utterance: 1 });
    assert_eq!(controller.state(), AlertState::Idle);
    assert!(!controller.has_worker());

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].text, "The Object is rock");
    assert_eq!(log[0].thread, thread::current().id());
}

#[test]
fn continuous_repeats_until_stopped() {
    let backend = ScriptedBackend::new(Duration::from_millis(10));
    let log = backend.log();
    let (controller, mut rx) = controller_with(backend);

    let report = controller
        .start("WARNING It's a Mine", AlertMode::Continuous)
        .unwrap();
    assert_eq!(report, AlertReport::LoopStarted);
    assert_eq!(controller.state(), AlertState::SpeakingLoop);
    assert!(controller.has_worker());

    assert!(wait_until(|| log.lock().unwrap().len() >= 3));

    controller.stop();
    assert_eq!(controller.state(), AlertState::Idle);
    assert!(!controller.has_worker());

    let spoken_at_stop = log.lock().unwrap().len();
    thread::sleep(Duration::from_millis(60));
    assert_eq!(log.lock().unwrap().len(), spoken_at_stop);

    let log = log.lock().unwrap();
    assert!(log.iter().all(|s| s.text == "WARNING It's a Mine"));
    assert!(
        log.iter()
            .all(|s| s.thread_name.as_deref() == Some(ALERT_THREAD_NAME))
    );

    let events = drain(&mut rx);
    assert_no_interleaving(&events);
    assert_eq!(
        events.last(),
        Some(&AlertEvent::StateChanged(AlertState::Idle))
    );
}

#[test]
fn loop_state_is_published_before_the_first_utterance() {
    let backend = ScriptedBackend::new(Duration::from_millis(10));
    let (controller, mut rx) = controller_with(backend);

    for _ in 0..20 {
        let before = controller.status().utterances;
        controller
            .start("WARNING It's a Mine", AlertMode::Continuous)
            .unwrap();
        assert_eq!(controller.status().state, AlertState::SpeakingLoop);
        assert!(wait_until(|| controller.status().utterances > before));
        controller.stop();

        let events = drain(&mut rx);
        let loop_at = events
            .iter()
            .position(|e| *e == AlertEvent::StateChanged(AlertState::SpeakingLoop))
            .unwrap();
        let first_utterance = events
            .iter()
            .position(|e| matches!(e, AlertEvent::UtteranceStarted { .. }))
            .unwrap();
        assert!(loop_at < first_utterance, "events out of order: {events:?}");
    }
}

#[test]
fn stop_interrupts_a_long_utterance() {
    let backend = ScriptedBackend::new(Duration::from_secs(30));
    let (controller, mut rx) = controller_with(backend);

    controller
        .start("WARNING It's a Mine", AlertMode::Continuous)
        .unwrap();
    assert!(wait_until(|| controller.status().utterances >= 1));

    let started = Instant::now();
    controller.stop();
    assert!(started.elapsed() < Duration::from_secs(5));

    let events = drain(&mut rx);
    assert!(events.contains(&AlertEvent::UtteranceFinished {
        seq: 1,
        interrupted: true
    }));
}

#[test]
fn stop_when_idle_is_a_prompt_no_op() {
    let (controller, mut rx) = controller_with(ScriptedBackend::new(Duration::from_millis(10)));

    let started = Instant::now();
    for _ in 0..3 {
        controller.stop();
    }
    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(controller.state(), AlertState::Idle);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn once_after_loop_retires_the_worker_first() {
    let backend = ScriptedBackend::new(Duration::from_millis(20));
    let log = backend.log();
    let (controller, mut rx) = controller_with(backend);

    controller
        .start("WARNING It's a Mine", AlertMode::Continuous)
        .unwrap();
    assert!(wait_until(|| log.lock().unwrap().len() >= 2));

    let report = controller
        .start("The Object is rock", AlertMode::Once)
        .unwrap();
    assert!(matches!(report, AlertReport::Spoken { .. }));
    assert_eq!(controller.state(), AlertState::Idle);
    assert!(!controller.has_worker());

    // The rock announcement is the last thing said, and nothing follows it.
    thread::sleep(Duration::from_millis(60));
    let log = log.lock().unwrap();
    assert_eq!(log.last().map(|s| s.text.as_str()), Some("The Object is rock"));
    assert_eq!(
        log.iter()
            .filter(|s| s.text == "The Object is rock")
            .count(),
        1
    );

    assert_no_interleaving(&drain(&mut rx));
}

#[test]
fn at_most_one_worker_across_restarts() {
    let backend = ScriptedBackend::new(Duration::from_millis(5));
    let log = backend.log();
    let (controller, mut rx) = controller_with(backend);

    for round in 0..5 {
        controller
            .start(&format!("alert {round}"), AlertMode::Continuous)
            .unwrap();
        assert!(wait_until(|| {
            log.lock()
                .unwrap()
                .iter()
                .any(|s| s.text == format!("alert {round}"))
        }));
        assert!(controller.has_worker());
    }
    controller.stop();

    // Once a worker's thread is superseded it never speaks again.
    let log = log.lock().unwrap();
    let mut retired: Vec<ThreadId> = Vec::new();
    let mut current: Option<ThreadId> = None;
    for spoken in log.iter() {
        assert!(
            !retired.contains(&spoken.thread),
            "a retired worker spoke again"
        );
        if current != Some(spoken.thread) {
            if let Some(previous) = current {
                retired.push(previous);
            }
            current = Some(spoken.thread);
        }
    }
    assert_eq!(retired.len(), 4);

    assert_no_interleaving(&drain(&mut rx));
}

#[test]
fn runtime_error_ends_the_loop() {
    let backend = ScriptedBackend::new(Duration::from_millis(5)).failing_on(2);
    let log = backend.log();
    let (controller, mut rx) = controller_with(backend);

    controller
        .start("WARNING It's a Mine", AlertMode::Continuous)
        .unwrap();

    // The worker exits on its own; the next query reaps it.
    assert!(wait_until(|| controller.state() == AlertState::Idle));
    assert!(!controller.has_worker());

    let status = controller.status();
    assert_eq!(
        status.last_error.as_deref(),
        Some("Speech synthesis failed: audio device lost")
    );

    thread::sleep(Duration::from_millis(40));
    assert_eq!(log.lock().unwrap().len(), 2, "no retry after the error");

    let events = drain(&mut rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, AlertEvent::Error(message) if message.contains("audio device lost")))
    );
}

#[test]
fn once_failure_is_reported_not_raised() {
    let backend = ScriptedBackend::new(Duration::from_millis(5)).failing_on(1);
    let (controller, _rx) = controller_with(backend);

    let report = controller
        .start("The Object is rock", AlertMode::Once)
        .unwrap();
    assert!(matches!(report, AlertReport::SpeechFailed { .. }));
    assert!(report.problem().unwrap().starts_with("Error during speech:"));
    assert_eq!(controller.state(), AlertState::Idle);
}

#[test]
fn unavailable_backend_mutes_alerts() {
    let (controller, mut rx) = AlertController::unavailable("no speech program", fast_config());

    for mode in [AlertMode::Once, AlertMode::Continuous] {
        let report = controller.start("WARNING It's a Mine", mode).unwrap();
        assert_eq!(
            report,
            AlertReport::Muted {
                reason: "no speech program".to_string()
            }
        );
        assert_eq!(controller.state(), AlertState::Idle);
        assert!(!controller.has_worker());
    }

    assert_eq!(
        controller.take_unavailable_notice().as_deref(),
        Some("no speech program")
    );
    assert_eq!(controller.take_unavailable_notice(), None);

    let status = controller.status();
    assert_eq!(status.backend, None);
    assert_eq!(status.utterances, 0);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn empty_text_is_rejected() {
    let backend = ScriptedBackend::new(Duration::from_millis(5));
    let log = backend.log();
    let (controller, mut rx) = controller_with(backend);

    assert_eq!(
        controller.start("   ", AlertMode::Continuous),
        Err(AlertError::EmptyText)
    );
    assert_eq!(controller.state(), AlertState::Idle);
    assert!(log.lock().unwrap().is_empty());
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn dropping_the_controller_stops_the_worker() {
    let backend = ScriptedBackend::new(Duration::from_millis(5));
    let log = backend.log();
    let (controller, _rx) = controller_with(backend);

    controller
        .start("WARNING It's a Mine", AlertMode::Continuous)
        .unwrap();
    assert!(wait_until(|| !log.lock().unwrap().is_empty()));

    drop(controller);
    let spoken = log.lock().unwrap().len();
    thread::sleep(Duration::from_millis(60));
    assert_eq!(log.lock().unwrap().len(), spoken);
}

#[test]
fn stop_from_another_thread_cuts_a_single_utterance_short() {
    let backend = ScriptedBackend::new(Duration::from_secs(30));
    let log = backend.log();
    let (controller, _rx) = controller_with(backend);
    let controller = Arc::new(controller);

    let speaker = {
        let controller = Arc::clone(&controller);
        thread::spawn(move || controller.start("The Object is rock", AlertMode::Once))
    };
    assert!(wait_until(|| !log.lock().unwrap().is_empty()));
    assert_eq!(controller.state(), AlertState::SpeakingOnce);

    let started = Instant::now();
    controller.stop();
    assert!(started.elapsed() < Duration::from_secs(5));

    let report = speaker.join().unwrap().unwrap();
    assert!(matches!(report, AlertReport::Spoken { utterance: 1 }));
    assert_eq!(controller.state(), AlertState::Idle);
}
