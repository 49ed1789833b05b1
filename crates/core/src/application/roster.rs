// Roster Service - server registration, check-in/out and daily reset

use crate::application::coordinator::load_server;
use crate::application::dispatcher::constants::DAY_MILLIS;
use crate::application::selector;
use crate::domain::{Server, ServerBoard, ServerStatus};
use crate::error::{AppError, Result};
use crate::port::{
    CounterTransaction, IdProvider, ServerRoster, TimeProvider, TransactionalCounterStore,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Service day index for a timestamp, shifted by the local UTC offset
pub fn service_day(now_millis: i64, utc_offset_minutes: i64) -> i64 {
    (now_millis + utc_offset_minutes * 60_000).div_euclid(DAY_MILLIS)
}

pub struct RosterService {
    store: Arc<dyn TransactionalCounterStore>,
    roster: Arc<dyn ServerRoster>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    utc_offset_minutes: i64,
}

impl RosterService {
    pub fn new(
        store: Arc<dyn TransactionalCounterStore>,
        roster: Arc<dyn ServerRoster>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            store,
            roster,
            id_provider,
            time_provider,
            utc_offset_minutes: 0,
        }
    }

    /// Local offset used to decide when a new service day begins
    pub fn with_utc_offset_minutes(mut self, minutes: i64) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    pub fn today(&self) -> i64 {
        service_day(self.time_provider.now_millis(), self.utc_offset_minutes)
    }

    /// Register a new (absent, active) server
    pub async fn register_server(&self, name: &str) -> Result<Server> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Server name must not be empty".to_string(),
            ));
        }
        if name.chars().count() > crate::application::intake::enqueue::MAX_NAME_LEN {
            return Err(AppError::Validation("Server name too long".to_string()));
        }

        let server = Server::new(
            self.id_provider.generate_id(),
            self.time_provider.now_millis(),
            name,
        );

        let mut tx = self.store.begin_transaction().await?;
        tx.insert_server(&server).await?;
        tx.commit().await?;

        info!(server_id = %server.id, name = %server.name, "Server registered");
        Ok(server)
    }

    /// Activate or deactivate a server; only absent servers may be deactivated
    pub async fn set_active(&self, server_id: &str, active: bool) -> Result<Server> {
        let mut tx = self.store.begin_transaction().await?;

        let server = load_server(tx.as_mut(), server_id).await?;
        if !active && server.is_present() {
            return Err(AppError::Conflict(format!(
                "Server {} must check out before deactivation (status: {})",
                server.id, server.status
            )));
        }

        let server = tx.set_active(&server.id, active).await?;
        tx.commit().await?;

        info!(server_id = %server.id, active, "Server active flag changed");
        Ok(server)
    }

    /// Check a server in, assigning the next arrival rank
    pub async fn check_in(&self, server_id: &str) -> Result<i64> {
        let mut tx = self.store.begin_transaction().await?;

        let server = load_server(tx.as_mut(), server_id).await?;
        if server.is_present() {
            return Err(AppError::Conflict(format!(
                "Server {} is already checked in (status: {})",
                server.id, server.status
            )));
        }

        // Read inside the transaction so concurrent check-ins never share a rank
        let rank = tx.max_arrival_rank().await? + 1;
        let server = tx.check_in(&server.id, rank).await?;
        tx.commit().await?;

        info!(server_id = %server.id, arrival_rank = rank, "Server checked in");
        Ok(rank)
    }

    /// Check a server out; a serving server cannot leave
    pub async fn check_out(&self, server_id: &str) -> Result<Server> {
        let mut tx = self.store.begin_transaction().await?;

        let server = load_server(tx.as_mut(), server_id).await?;
        match server.status {
            ServerStatus::Serving => {
                warn!(server_id = %server.id, "Check-out refused while serving");
                return Err(AppError::Conflict(format!(
                    "Server {} is serving a ticket",
                    server.id
                )));
            }
            ServerStatus::Absent => {
                return Err(AppError::Conflict(format!(
                    "Server {} is not checked in",
                    server.id
                )));
            }
            ServerStatus::Idle => {}
        }

        let server = tx.check_out(&server.id).await?;
        tx.commit().await?;

        info!(server_id = %server.id, "Server checked out");
        Ok(server)
    }

    /// Idle server the selector would pick next
    pub async fn next_available(&self) -> Result<Option<Server>> {
        let idle = self.roster.find_by_status(ServerStatus::Idle).await?;
        Ok(selector::pick_server(&idle).cloned())
    }

    /// All servers grouped by status
    pub async fn list_servers(&self) -> Result<ServerBoard> {
        Ok(ServerBoard::from_servers(self.roster.list_all().await?))
    }

    /// Unconditional start-of-day reset; returns the number of servers reset
    pub async fn reset_daily(&self) -> Result<u64> {
        let day = self.today();
        let mut tx = self.store.begin_transaction().await?;
        let count = reset_in(tx.as_mut(), day).await?;
        tx.commit().await?;

        info!(servers_reset = count, service_day = day, "Daily reset applied");
        Ok(count)
    }

    /// Reset only when no reset has been recorded for the current service day
    ///
    /// Returns `None` when today's reset already happened.
    pub async fn reset_daily_if_due(&self) -> Result<Option<u64>> {
        let day = self.today();
        let mut tx = self.store.begin_transaction().await?;

        if let Some(last) = tx.last_reset_day().await? {
            if last >= day {
                tx.rollback().await?;
                return Ok(None);
            }
        }

        let count = reset_in(tx.as_mut(), day).await?;
        tx.commit().await?;

        info!(servers_reset = count, service_day = day, "Scheduled daily reset applied");
        Ok(Some(count))
    }
}

async fn reset_in(tx: &mut dyn CounterTransaction, day: i64) -> Result<u64> {
    let serving = tx.count_serving().await?;
    if serving > 0 {
        return Err(AppError::Conflict(format!(
            "{} server(s) still serving, finish or cancel their tickets before the daily reset",
            serving
        )));
    }
    let count = tx.reset_daily().await?;
    tx.record_reset_day(day).await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_day_boundaries() {
        assert_eq!(service_day(0, 0), 0);
        assert_eq!(service_day(DAY_MILLIS - 1, 0), 0);
        assert_eq!(service_day(DAY_MILLIS, 0), 1);
    }

    #[test]
    fn test_service_day_with_negative_offset() {
        // 02:00 UTC on day 1 is still day 0 at UTC-3
        let two_am = DAY_MILLIS + 2 * 3_600_000;
        assert_eq!(service_day(two_am, 0), 1);
        assert_eq!(service_day(two_am, -180), 0);
    }
}
