//! Cooperative cancellation shared between the controller and its worker.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// A flag the alert worker checks between (and during) utterances.
///
/// Cloning yields a handle to the same flag. Unlike a bare `AtomicBool`,
/// waiting on the token wakes up as soon as it is cancelled, so the pause
/// between repeats never delays `stop()`.
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake every waiter.
    pub fn cancel(&self) {
        let (flag, cvar) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
        tracing::trace!("Cancellation requested");
    }

    /// Clear the flag before a new alert starts.
    pub fn reset(&self) {
        let (flag, _) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }

    pub fn is_cancelled(&self) -> bool {
        let (flag, _) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for up to `timeout`. Returns `true` if cancelled.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = cvar
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn starts_clear() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        token.reset();
        assert!(!clone.is_cancelled());
    }

    #[test]
    fn wait_times_out_when_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.wait_for(Duration::from_millis(10)));
    }

    #[test]
    fn wait_returns_immediately_when_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let started = Instant::now();
        assert!(token.wait_for(Duration::from_secs(5)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn cancel_wakes_a_waiter() {
        let token = CancellationToken::new();
        let waiter = {
            let token = token.clone();
            thread::spawn(move || {
                let started = Instant::now();
                (token.wait_for(Duration::from_secs(10)), started.elapsed())
            })
        };
        thread::sleep(Duration::from_millis(20));
        token.cancel();

        let (cancelled, waited) = waiter.join().unwrap();
        assert!(cancelled);
        assert!(waited < Duration::from_secs(5));
    }
}
