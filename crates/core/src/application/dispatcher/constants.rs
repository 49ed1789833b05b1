// Dispatcher constants (no magic values)
use std::time::Duration;

/// Default pause between auto-dispatch passes (1s)
pub const DEFAULT_DISPATCH_INTERVAL: Duration = Duration::from_secs(1);

/// Sleep duration after a dispatch error before retry (1s)
pub const ERROR_RECOVERY_SLEEP_DURATION: Duration = Duration::from_secs(1);

/// Upper bound on assignments made in a single pass
/// Keeps one pass from monopolizing the store when the queue is long
pub const MAX_ASSIGNMENTS_PER_TICK: usize = 64;

/// Milliseconds in one service day
pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Default interval between daily-reset checks (5 minutes)
pub const DEFAULT_RESET_CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);
