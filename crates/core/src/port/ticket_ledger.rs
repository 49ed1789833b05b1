// Ticket Ledger Port (Interface)

use crate::domain::{Charge, Ticket, TicketId, TicketStatus};
use crate::error::Result;
use async_trait::async_trait;

/// Read side of the ticket ledger (projections outside any transaction)
#[async_trait]
pub trait TicketLedger: Send + Sync {
    /// Find ticket by ID
    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>>;

    /// Waiting tickets in FIFO order (creation time, then insertion order)
    async fn list_waiting(&self) -> Result<Vec<Ticket>>;

    /// All tickets in a status, oldest first
    async fn find_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>>;

    /// Count tickets by status
    async fn count_by_status(&self, status: TicketStatus) -> Result<i64>;
}

/// Ledger operations within a transaction
///
/// Mutators fail with `AppError::NotFound` for unknown ids and with
/// `DomainError::InvalidStateTransition` when the current status does not
/// legally precede the requested one.
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Insert a new ticket
    async fn insert_ticket(&mut self, ticket: &Ticket) -> Result<()>;

    /// Find ticket by ID (within transaction)
    async fn find_ticket(&mut self, id: &TicketId) -> Result<Option<Ticket>>;

    /// Oldest waiting ticket
    async fn next_waiting(&mut self) -> Result<Option<Ticket>>;

    /// Waiting -> InService
    async fn mark_in_service(
        &mut self,
        id: &TicketId,
        server_id: &str,
        now_millis: i64,
    ) -> Result<Ticket>;

    /// InService -> Finished
    async fn mark_finished(
        &mut self,
        id: &TicketId,
        now_millis: i64,
        charge: Option<Charge>,
        note: Option<String>,
    ) -> Result<Ticket>;

    /// Waiting | InService -> Cancelled
    async fn mark_cancelled(
        &mut self,
        id: &TicketId,
        now_millis: i64,
        reason: Option<String>,
    ) -> Result<Ticket>;
}
