// Intake Service - front door of the ticket ledger

pub mod enqueue;
mod enqueue_test;

pub use enqueue::EnqueueRequest;

use crate::domain::{Ticket, TicketId, TicketStatus};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, TicketLedger, TimeProvider, TransactionalCounterStore};
use std::sync::Arc;

/// Ticket intake and ledger projections
pub struct IntakeService {
    store: Arc<dyn TransactionalCounterStore>,
    ledger: Arc<dyn TicketLedger>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl IntakeService {
    pub fn new(
        store: Arc<dyn TransactionalCounterStore>,
        ledger: Arc<dyn TicketLedger>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            store,
            ledger,
            id_provider,
            time_provider,
        }
    }

    /// Enqueue a new waiting ticket
    pub async fn enqueue(&self, req: EnqueueRequest) -> Result<TicketId> {
        enqueue::execute(
            self.store.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            req,
        )
        .await
    }

    /// Waiting tickets in service order
    pub async fn list_waiting(&self) -> Result<Vec<Ticket>> {
        self.ledger.list_waiting().await
    }

    /// Tickets currently being served
    pub async fn list_in_service(&self) -> Result<Vec<Ticket>> {
        self.ledger.find_by_status(TicketStatus::InService).await
    }

    pub async fn find_ticket(&self, id: &str) -> Result<Ticket> {
        self.ledger
            .find_by_id(&id.to_string())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", id)))
    }
}
