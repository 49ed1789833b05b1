// Daily Reset Scheduler
// Returns every server to absent once per service day

use crate::application::dispatcher::constants::DEFAULT_RESET_CHECK_INTERVAL;
use crate::application::dispatcher::ShutdownToken;
use crate::application::roster::RosterService;
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// Periodically applies the start-of-day roster reset
///
/// The last reset day is kept in the store, so restarts and multiple
/// daemons still reset at most once per day.
pub struct DailyResetScheduler {
    roster: Arc<RosterService>,
    check_interval: Duration,
}

impl DailyResetScheduler {
    pub fn new(roster: Arc<RosterService>) -> Self {
        Self {
            roster,
            check_interval: DEFAULT_RESET_CHECK_INTERVAL,
        }
    }

    pub fn with_check_interval(mut self, check_interval: Duration) -> Self {
        self.check_interval = check_interval;
        self
    }

    /// Run reset loop (background task)
    pub async fn run(self, mut shutdown: ShutdownToken) {
        info!(
            check_interval_secs = self.check_interval.as_secs(),
            "Daily reset scheduler started"
        );

        let mut tick = interval(self.check_interval);

        loop {
            tokio::select! {
                _ = tick.tick() => {},
                _ = shutdown.wait() => break,
            }

            if let Err(e) = self.run_now().await {
                // Typically staff still serving past midnight; retried next tick
                warn!(error = %e, "Daily reset deferred");
            }
        }

        info!("Daily reset scheduler stopped");
    }

    /// Check once and reset if today's reset is still pending
    pub async fn run_now(&self) -> Result<Option<u64>> {
        let outcome = self.roster.reset_daily_if_due().await?;
        match outcome {
            Some(count) => info!(servers_reset = count, "Daily reset completed"),
            None => debug!("Daily reset already applied today"),
        }
        Ok(outcome)
    }
}
