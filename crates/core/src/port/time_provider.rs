// Time Provider Port (for testability)

use std::sync::atomic::{AtomicI64, Ordering};

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Deterministic clock for tests
///
/// Returns the current value and then advances by `step_ms`, so a stepping
/// clock hands out strictly increasing timestamps.
pub struct FixedTimeProvider {
    now: AtomicI64,
    step_ms: i64,
}

impl FixedTimeProvider {
    pub fn new(start_millis: i64) -> Self {
        Self::stepping(start_millis, 0)
    }

    pub fn stepping(start_millis: i64, step_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
            step_ms,
        }
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl TimeProvider for FixedTimeProvider {
    fn now_millis(&self) -> i64 {
        self.now.fetch_add(self.step_ms, Ordering::SeqCst)
    }
}
