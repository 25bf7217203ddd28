//! Fixed-interval gate for outbound Scryfall requests.

use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

/// Spaces successive requests at least `interval` apart.
///
/// Each client owns its gate, so tests can build one with a zero interval or
/// [`reset`](Self::reset) it between cases.
#[derive(Debug)]
pub struct RequestGate {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RequestGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    /// A gate that never waits.
    pub fn unthrottled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block until the next slot is open and claim it.
    ///
    /// Returns how long the caller slept.
    pub fn wait(&self) -> Duration {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let delay = match *last {
            Some(prev) => self.interval.saturating_sub(now.duration_since(prev)),
            None => Duration::ZERO,
        };
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        *last = Some(Instant::now());
        delay
    }

    /// Forget the previous request so the next `wait` returns immediately.
    pub fn reset(&self) {
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl Default for RequestGate {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_REQUEST_INTERVAL)
    }
}
