//! Speech through a system TTS program run as a child process.
//!
//! The program is located once at start-up with [`which`]. Each utterance
//! spawns a fresh child; waiting polls it so that a cancelled alert can kill
//! the child mid-sentence instead of waiting for it to finish. The child's
//! stderr is drained on a reader thread so a chatty program can never stall
//! on a full pipe.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use super::{SpeechBackend, SpeechConfig, UtteranceOutcome};
use crate::cancel::CancellationToken;
use crate::error::VoiceError;

/// How often a running child is checked for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Most stderr bytes kept for an error message; the rest is discarded.
const STDERR_LIMIT: usize = 4096;

/// How long a failed child's stderr reader gets to reach end of stream.
const STDERR_GRACE: Duration = Duration::from_millis(500);

/// Known speech programs, in probe order.
const CANDIDATES: [SpeechProgram; 4] = [
    SpeechProgram::EspeakNg,
    SpeechProgram::Espeak,
    SpeechProgram::Say,
    SpeechProgram::SpdSay,
];

/// Speech program flavour; decides the command-line shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechProgram {
    EspeakNg,
    Espeak,
    /// macOS `say`.
    Say,
    /// speech-dispatcher client.
    SpdSay,
    /// Anything else: the text is passed as the only argument.
    Other(String),
}

impl SpeechProgram {
    /// Classify a program by its file name.
    pub fn from_program(program: &str) -> Self {
        let stem = Path::new(program)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(program);
        match stem {
            "espeak-ng" => Self::EspeakNg,
            "espeak" => Self::Espeak,
            "say" => Self::Say,
            "spd-say" => Self::SpdSay,
            _ => Self::Other(program.to_string()),
        }
    }

    /// Executable name looked up on `PATH`.
    pub fn program(&self) -> &str {
        match self {
            Self::EspeakNg => "espeak-ng",
            Self::Espeak => "espeak",
            Self::Say => "say",
            Self::SpdSay => "spd-say",
            Self::Other(program) => program,
        }
    }

    /// Arguments for one utterance at `rate` words per minute.
    pub fn args(&self, text: &str, rate: u32) -> Vec<String> {
        match self {
            Self::EspeakNg | Self::Espeak => {
                vec!["-s".to_string(), rate.to_string(), text.to_string()]
            }
            Self::Say => vec!["-r".to_string(), rate.to_string(), text.to_string()],
            Self::SpdSay => vec!["--wait".to_string(), text.to_string()],
            Self::Other(_) => vec![text.to_string()],
        }
    }
}

/// [`SpeechBackend`] that shells out to a system speech program.
pub struct CommandSpeechBackend {
    program: SpeechProgram,
    path: PathBuf,
    rate: u32,
    running: Option<Running>,
}

/// A spawned utterance and the reader draining its stderr.
struct Running {
    child: Child,
    stderr: Option<mpsc::Receiver<String>>,
}

impl Running {
    /// Kill the child and reap it. Returns the exit status once reaped.
    fn kill(mut self) -> Option<ExitStatus> {
        let _ = self.child.kill();
        self.child.wait().ok()
    }

    /// Captured stderr, or empty if the reader has not finished in time.
    fn stderr(&self) -> String {
        self.stderr
            .as_ref()
            .and_then(|rx| rx.recv_timeout(STDERR_GRACE).ok())
            .unwrap_or_default()
    }
}

/// Read `pipe` to the end on a helper thread, keeping the first
/// [`STDERR_LIMIT`] bytes.
fn drain_stderr(mut pipe: ChildStderr) -> std::io::Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::sync_channel(1);
    thread::Builder::new()
        .name("sonar-speech-stderr".into())
        .spawn(move || {
            let mut kept = Vec::new();
            let mut buf = [0_u8; 4096];
            loop {
                match pipe.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        let room = STDERR_LIMIT.saturating_sub(kept.len());
                        kept.extend_from_slice(&buf[..n.min(room)]);
                    }
                }
            }
            let _ = tx.send(String::from_utf8_lossy(&kept).into_owned());
        })?;
    Ok(rx)
}

impl CommandSpeechBackend {
    /// Locate a speech program.
    ///
    /// Uses `config.program` when set, otherwise the first of `espeak-ng`,
    /// `espeak`, `say` and `spd-say` found on `PATH`.
    pub fn detect(config: &SpeechConfig) -> Result<Self, VoiceError> {
        if let Some(program) = config.program.as_deref() {
            let path = which::which(program).map_err(|e| {
                VoiceError::BackendUnavailable(format!(
                    "speech program '{program}' not found: {e}"
                ))
            })?;
            return Ok(Self::with_program(
                SpeechProgram::from_program(program),
                path,
                config.rate,
            ));
        }

        for candidate in CANDIDATES {
            if let Ok(path) = which::which(candidate.program()) {
                tracing::debug!(program = candidate.program(), path = %path.display(), "Found speech program");
                return Ok(Self::with_program(candidate, path, config.rate));
            }
        }

        let tried: Vec<String> = CANDIDATES
            .iter()
            .map(|candidate| candidate.program().to_string())
            .collect();
        Err(VoiceError::BackendUnavailable(format!(
            "none of {} found on PATH",
            tried.join(", ")
        )))
    }

    /// Use an already-resolved program path.
    pub fn with_program(program: SpeechProgram, path: PathBuf, rate: u32) -> Self {
        Self {
            program,
            path,
            rate,
            running: None,
        }
    }

    pub const fn program(&self) -> &SpeechProgram {
        &self.program
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn kill_child(&mut self) {
        if let Some(running) = self.running.take() {
            running.kill();
        }
    }
}

impl SpeechBackend for CommandSpeechBackend {
    fn name(&self) -> &str {
        self.program.program()
    }

    fn say(&mut self, text: &str) -> Result<(), VoiceError> {
        self.kill_child();

        let mut child = Command::new(&self.path)
            .args(self.program.args(text, self.rate))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| VoiceError::SpawnFailed(format!("{}: {e}", self.path.display())))?;

        let stderr = match child.stderr.take().map(drain_stderr).transpose() {
            Ok(stderr) => stderr,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(VoiceError::SpawnFailed(format!("stderr reader: {e}")));
            }
        };

        tracing::debug!(program = self.name(), pid = child.id(), "Utterance started");
        self.running = Some(Running { child, stderr });
        Ok(())
    }

    fn run_until_done(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<UtteranceOutcome, VoiceError> {
        let Some(mut running) = self.running.take() else {
            return Ok(UtteranceOutcome::Completed);
        };

        loop {
            if cancel.is_cancelled() {
                running.kill();
                tracing::debug!(program = self.name(), "Utterance interrupted");
                return Ok(UtteranceOutcome::Interrupted);
            }

            match running.child.try_wait() {
                Ok(Some(status)) if status.success() => return Ok(UtteranceOutcome::Completed),
                Ok(Some(status)) => {
                    let stderr = running.stderr();
                    let stderr = stderr.trim();
                    let message = if stderr.is_empty() {
                        format!("{} exited with {status}", self.name())
                    } else {
                        format!("{} exited with {status}: {stderr}", self.name())
                    };
                    return Err(VoiceError::SynthesisError(message));
                }
                Ok(None) => {
                    cancel.wait_for(POLL_INTERVAL);
                }
                Err(e) => {
                    running.kill();
                    return Err(VoiceError::SynthesisError(e.to_string()));
                }
            }
        }
    }
}

impl Drop for CommandSpeechBackend {
    fn drop(&mut self) {
        self.kill_child();
    }
}

impl std::fmt::Debug for CommandSpeechBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpeechBackend")
            .field("program", &self.program)
            .field("path", &self.path)
            .field("rate", &self.rate)
            .field("speaking", &self.running.is_some())
            .finish()
    }
}
