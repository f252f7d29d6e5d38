use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Source of "now" for the limiter, so tests can move time by hand.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|e| e.into_inner());
        self.base + offset
    }
}

/// Sliding-window limiter keyed by action identifier.
///
/// Each key keeps the instants of its accepted attempts that are still inside
/// the trailing window. A denied attempt is not recorded.
pub struct SlidingWindowLimiter {
    /// key -> accepted attempt instants, oldest first
    entries: DashMap<String, VecDeque<Instant>>,
    clock: Arc<dyn Clock>,
}

impl SlidingWindowLimiter {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Record an attempt for `key` if fewer than `max_attempts` happened within `window`.
    pub fn is_allowed(&self, key: &str, max_attempts: usize, window: Duration) -> bool {
        let now = self.clock.now();

        let mut entry = self.entries.entry(key.to_string()).or_default();
        prune(entry.value_mut(), now, window);

        if entry.len() >= max_attempts {
            return false;
        }

        entry.push_back(now);
        true
    }

    /// Time until the oldest attempt for `key` leaves the window. Zero when not throttled.
    pub fn retry_after(&self, key: &str, max_attempts: usize, window: Duration) -> Duration {
        let now = self.clock.now();
        let Some(entry) = self.entries.get(key) else {
            return Duration::ZERO;
        };

        let live: Vec<&Instant> = entry
            .iter()
            .filter(|t| now.duration_since(**t) < window)
            .collect();

        match live.first() {
            Some(oldest) if live.len() >= max_attempts => {
                window.saturating_sub(now.duration_since(**oldest))
            }
            _ => Duration::ZERO,
        }
    }

    /// Drop keys that have no attempts left inside `window`.
    pub fn cleanup(&self, window: Duration) {
        let now = self.clock.now();
        self.entries.retain(|_, attempts| {
            prune(attempts, now, window);
            !attempts.is_empty()
        });
    }

    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new()
    }
}

fn prune(attempts: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = attempts.front() {
        if now.duration_since(*oldest) < window {
            break;
        }
        attempts.pop_front();
    }
}
