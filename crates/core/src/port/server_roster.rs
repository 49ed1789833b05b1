// Server Roster Port (Interface)

use crate::domain::{Server, ServerId, ServerStatus};
use crate::error::Result;
use async_trait::async_trait;

/// Read side of the server roster
#[async_trait]
pub trait ServerRoster: Send + Sync {
    /// Find server by ID
    async fn find_by_id(&self, id: &ServerId) -> Result<Option<Server>>;

    /// All registered servers
    async fn list_all(&self) -> Result<Vec<Server>>;

    /// Servers in a status, by arrival rank
    async fn find_by_status(&self, status: ServerStatus) -> Result<Vec<Server>>;

    /// Count servers by status
    async fn count_by_status(&self, status: ServerStatus) -> Result<i64>;
}

/// Roster operations within a transaction
///
/// Status mutators fail with `AppError::NotFound` for unknown ids and with a
/// `DomainError` when the server is not in the expected prior status.
#[async_trait]
pub trait RosterTransaction: Send {
    /// Insert a new server
    async fn insert_server(&mut self, server: &Server) -> Result<()>;

    /// Find server by ID (within transaction)
    async fn find_server(&mut self, id: &ServerId) -> Result<Option<Server>>;

    /// Snapshot of all idle servers
    async fn idle_servers(&mut self) -> Result<Vec<Server>>;

    /// Highest arrival rank among present servers (0 when nobody is present)
    async fn max_arrival_rank(&mut self) -> Result<i64>;

    /// Absent -> Idle with the given rank
    async fn check_in(&mut self, id: &ServerId, rank: i64) -> Result<Server>;

    /// Idle -> Absent
    async fn check_out(&mut self, id: &ServerId) -> Result<Server>;

    /// Idle -> Serving
    async fn begin_service(&mut self, id: &ServerId) -> Result<Server>;

    /// Serving -> Idle, incrementing the daily count when `completed`
    async fn end_service(&mut self, id: &ServerId, completed: bool) -> Result<Server>;

    /// Toggle the active flag
    async fn set_active(&mut self, id: &ServerId, active: bool) -> Result<Server>;

    /// Number of servers currently serving
    async fn count_serving(&mut self) -> Result<i64>;

    /// Return every server to absent with rank and count zeroed
    async fn reset_daily(&mut self) -> Result<u64>;

    /// Last service day that was reset, if any
    async fn last_reset_day(&mut self) -> Result<Option<i64>>;

    /// Record the service day of a reset
    async fn record_reset_day(&mut self, day: i64) -> Result<()>;
}
