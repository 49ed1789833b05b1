// Counter statistics (ticket and server counts per status)

use crate::domain::{ServerStatus, TicketStatus};
use crate::error::Result;
use crate::port::{ServerRoster, TicketLedger};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CounterStats {
    pub waiting: i64,
    pub in_service: i64,
    pub finished: i64,
    pub cancelled: i64,
    pub servers_absent: i64,
    pub servers_idle: i64,
    pub servers_serving: i64,
}

impl CounterStats {
    pub async fn collect(ledger: &dyn TicketLedger, roster: &dyn ServerRoster) -> Result<Self> {
        let mut stats = CounterStats::default();
        for status in TicketStatus::ALL {
            let n = ledger.count_by_status(status).await?;
            match status {
                TicketStatus::Waiting => stats.waiting = n,
                TicketStatus::InService => stats.in_service = n,
                TicketStatus::Finished => stats.finished = n,
                TicketStatus::Cancelled => stats.cancelled = n,
            }
        }
        for status in ServerStatus::ALL {
            let n = roster.count_by_status(status).await?;
            match status {
                ServerStatus::Absent => stats.servers_absent = n,
                ServerStatus::Idle => stats.servers_idle = n,
                ServerStatus::Serving => stats.servers_serving = n,
            }
        }
        Ok(stats)
    }
}
