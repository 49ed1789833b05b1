// Auto Dispatcher - background "assign on arrival / on idle" trigger

pub mod constants;
mod shutdown;

use constants::*;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::coordinator::DistributionCoordinator;
use crate::domain::DistributionOutcome;
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Repeatedly drains the queue through the coordinator
///
/// Any number of dispatchers (and operators) may run against the same store;
/// the coordinator's transactions keep them from double-assigning.
pub struct AutoDispatcher {
    coordinator: Arc<DistributionCoordinator>,
    interval: Duration,
}

impl AutoDispatcher {
    pub fn new(coordinator: Arc<DistributionCoordinator>) -> Self {
        Self {
            coordinator,
            interval: DEFAULT_DISPATCH_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run one drain pass; returns the number of assignments made
    pub async fn tick(&self) -> Result<usize> {
        let mut assigned = 0;
        while assigned < MAX_ASSIGNMENTS_PER_TICK {
            match self.coordinator.distribute_automatic().await? {
                DistributionOutcome::Assigned(a) => {
                    debug!(ticket_id = %a.ticket_id, server_id = %a.server_id, "Auto-assigned");
                    assigned += 1;
                }
                DistributionOutcome::NothingToDistribute => break,
            }
        }
        Ok(assigned)
    }

    /// Run dispatch loop with graceful shutdown support
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!(interval_ms = self.interval.as_millis() as u64, "Auto dispatcher started");
        loop {
            if shutdown.is_shutdown() {
                break;
            }
            let pause = match self.tick().await {
                Ok(n) => {
                    if n > 0 {
                        info!(assigned = n, "Auto-dispatch pass complete");
                    }
                    self.interval
                }
                Err(e) => {
                    // Requesters never see these; the queue simply waits
                    error!(error = %e, "Auto-dispatch pass failed");
                    ERROR_RECOVERY_SLEEP_DURATION
                }
            };
            tokio::select! {
                _ = sleep(pause) => {},
                _ = shutdown.wait() => {
                    info!("Auto dispatcher interrupted during idle");
                    break;
                }
            }
        }
        info!("Auto dispatcher stopped");
        Ok(())
    }
}
