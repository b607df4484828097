//! Per-source rate limiting.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Timestamp of the last processed invocation per source key.
///
/// Shared by reference between concurrent callers. [`Self::try_claim`]
/// checks and records under one lock, so of several invocations of one key
/// inside the window exactly one runs.
#[derive(Debug)]
pub struct CooldownState {
    window: Duration,
    last_run: Mutex<HashMap<String, Instant>>,
}

impl Default for CooldownState {
    fn default() -> Self {
        Self::new(Duration::from_millis(8000))
    }
}

impl CooldownState {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_run: Mutex::new(HashMap::new()),
        }
    }

    #[inline]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Time left before `key` may run again; `None` when it may run at `now`.
    pub fn remaining(&self, key: &str, now: Instant) -> Option<Duration> {
        let last = *self.lock().get(key)?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < self.window).then(|| self.window - elapsed)
    }

    /// Claim `key` at `now`, or return the time left on its window.
    ///
    /// A refused claim leaves the stored timestamp untouched.
    pub fn try_claim(&self, key: &str, now: Instant) -> Result<(), Duration> {
        let mut map = self.lock();
        match map.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(now);
                Ok(())
            }
            Entry::Occupied(mut slot) => {
                let elapsed = now.saturating_duration_since(*slot.get());
                if elapsed < self.window {
                    return Err(self.window - elapsed);
                }
                slot.insert(now);
                Ok(())
            }
        }
    }

    pub fn record(&self, key: &str, at: Instant) {
        self.lock().insert(key.to_string(), at);
    }

    pub fn last_run(&self, key: &str) -> Option<Instant> {
        self.lock().get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.last_run.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_may_run() {
        let state = CooldownState::default();
        assert_eq!(state.remaining("chan", Instant::now()), None);
        assert!(state.is_empty());
    }

    #[test]
    fn window_blocks_then_expires() {
        let state = CooldownState::new(Duration::from_secs(8));
        let t0 = Instant::now();
        state.record("chan", t0);
        assert_eq!(
            state.remaining("chan", t0 + Duration::from_secs(3)),
            Some(Duration::from_secs(5))
        );
        assert_eq!(state.remaining("chan", t0 + Duration::from_secs(8)), None);
        assert_eq!(state.remaining("other", t0), None);
    }

    #[test]
    fn zero_window_never_blocks() {
        let state = CooldownState::new(Duration::ZERO);
        let t0 = Instant::now();
        state.record("chan", t0);
        assert_eq!(state.remaining("chan", t0), None);
    }

    #[test]
    fn claim_is_exclusive_within_window() {
        let state = CooldownState::new(Duration::from_secs(8));
        let t0 = Instant::now();
        assert_eq!(state.try_claim("chan", t0), Ok(()));
        assert_eq!(
            state.try_claim("chan", t0 + Duration::from_secs(2)),
            Err(Duration::from_secs(6))
        );
        assert_eq!(state.last_run("chan"), Some(t0));
        assert_eq!(state.try_claim("chan", t0 + Duration::from_secs(8)), Ok(()));
        assert_eq!(state.last_run("chan"), Some(t0 + Duration::from_secs(8)));
    }

    #[test]
    fn keys_are_independent() {
        let state = CooldownState::default();
        let t0 = Instant::now();
        state.record("a", t0);
        state.record("b", t0 + Duration::from_secs(1));
        assert_eq!(state.len(), 2);
        assert_eq!(state.last_run("a"), Some(t0));
    }
}
