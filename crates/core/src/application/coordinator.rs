// Distribution Coordinator
//
// Every ticket/server transition runs inside one CounterTransaction. A failed
// precondition or storage error drops the transaction before commit, so callers
// observe either the full transition or no change at all.

use crate::application::selector;
use crate::domain::{
    Assignment, Charge, DistributionOutcome, DomainError, Server, ServerStatus, Ticket,
    TicketStatus,
};
use crate::error::{AppError, Result};
use crate::port::{CounterTransaction, TimeProvider, TransactionalCounterStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Applies assignment, completion and cancellation transitions atomically
pub struct DistributionCoordinator {
    store: Arc<dyn TransactionalCounterStore>,
    time_provider: Arc<dyn TimeProvider>,
}

impl DistributionCoordinator {
    pub fn new(
        store: Arc<dyn TransactionalCounterStore>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            store,
            time_provider,
        }
    }

    /// Pair the oldest waiting ticket with the least-loaded idle server
    ///
    /// Returns `NothingToDistribute` without mutating anything when either
    /// the queue or the idle roster is empty.
    pub async fn distribute_automatic(&self) -> Result<DistributionOutcome> {
        let mut tx = self.store.begin_transaction().await?;

        let waiting = tx.next_waiting().await?;
        let idle = tx.idle_servers().await?;

        let (ticket, server) = match selector::select(waiting.as_slice(), &idle) {
            Some((t, s)) => (t.clone(), s.clone()),
            None => {
                tx.rollback().await?;
                debug!(
                    waiting = waiting.is_some(),
                    idle_servers = idle.len(),
                    "Nothing to distribute"
                );
                return Ok(DistributionOutcome::NothingToDistribute);
            }
        };

        let assignment = self.assign(tx.as_mut(), &ticket, &server).await?;
        tx.commit().await?;

        info!(
            ticket_id = %assignment.ticket_id,
            server_id = %assignment.server_id,
            served_today = server.daily_served_count,
            arrival_rank = server.arrival_rank,
            "Ticket distributed"
        );
        Ok(DistributionOutcome::Assigned(assignment))
    }

    /// Operator override: assign an explicit pair, bypassing the selector
    pub async fn distribute_forced(&self, ticket_id: &str, server_id: &str) -> Result<Assignment> {
        let mut tx = self.store.begin_transaction().await?;

        let ticket = load_ticket(tx.as_mut(), ticket_id).await?;
        if ticket.status != TicketStatus::Waiting {
            return Err(rejected(
                "distribute_forced",
                DomainError::TicketNotWaiting {
                    ticket_id: ticket.id,
                    status: ticket.status.to_string(),
                },
            ));
        }

        let server = load_server(tx.as_mut(), server_id).await?;
        if server.status != ServerStatus::Idle {
            return Err(rejected(
                "distribute_forced",
                DomainError::ServerNotAvailable {
                    server_id: server.id,
                    status: server.status.to_string(),
                },
            ));
        }

        let assignment = self.assign(tx.as_mut(), &ticket, &server).await?;
        tx.commit().await?;

        info!(
            ticket_id = %assignment.ticket_id,
            server_id = %assignment.server_id,
            "Ticket assigned by operator"
        );
        Ok(assignment)
    }

    /// Finish an in-service ticket and return its server to idle
    pub async fn complete_ticket(
        &self,
        ticket_id: &str,
        charge: Option<Charge>,
        note: Option<String>,
    ) -> Result<Ticket> {
        if let Some(amount) = charge {
            if amount < 0 {
                return Err(AppError::Validation(format!(
                    "Charge must not be negative, got {}",
                    amount
                )));
            }
        }

        let mut tx = self.store.begin_transaction().await?;

        let ticket = load_ticket(tx.as_mut(), ticket_id).await?;
        if ticket.status != TicketStatus::InService {
            return Err(rejected(
                "complete_ticket",
                DomainError::NotInService {
                    ticket_id: ticket.id,
                    status: ticket.status.to_string(),
                },
            ));
        }
        let server_id = assigned_server(&ticket)?;

        let now = self.time_provider.now_millis();
        let finished = tx.mark_finished(&ticket.id, now, charge, note).await?;
        let server = tx.end_service(&server_id, true).await?;
        tx.commit().await?;

        info!(
            ticket_id = %finished.id,
            server_id = %server.id,
            served_today = server.daily_served_count,
            charge = ?finished.charge,
            "Ticket finished"
        );
        Ok(finished)
    }

    /// Cancel a waiting or in-service ticket, releasing its server if any
    ///
    /// Cancellation never counts toward the server's daily total.
    pub async fn cancel_ticket(&self, ticket_id: &str, reason: Option<String>) -> Result<Ticket> {
        let mut tx = self.store.begin_transaction().await?;

        let ticket = load_ticket(tx.as_mut(), ticket_id).await?;
        match ticket.status {
            TicketStatus::Finished => {
                return Err(rejected(
                    "cancel_ticket",
                    DomainError::AlreadyFinished(ticket.id),
                ));
            }
            TicketStatus::Cancelled => {
                return Err(rejected(
                    "cancel_ticket",
                    DomainError::InvalidStateTransition {
                        from: ticket.status.to_string(),
                        to: TicketStatus::Cancelled.to_string(),
                    },
                ));
            }
            TicketStatus::Waiting | TicketStatus::InService => {}
        }

        let released = if ticket.status == TicketStatus::InService {
            Some(assigned_server(&ticket)?)
        } else {
            None
        };

        let now = self.time_provider.now_millis();
        let cancelled = tx.mark_cancelled(&ticket.id, now, reason).await?;
        if let Some(server_id) = &released {
            tx.end_service(server_id, false).await?;
        }
        tx.commit().await?;

        info!(
            ticket_id = %cancelled.id,
            released_server = ?released,
            reason = ?cancelled.cancel_reason,
            "Ticket cancelled"
        );
        Ok(cancelled)
    }

    async fn assign(
        &self,
        tx: &mut dyn CounterTransaction,
        ticket: &Ticket,
        server: &Server,
    ) -> Result<Assignment> {
        let now = self.time_provider.now_millis();
        let ticket = tx.mark_in_service(&ticket.id, &server.id, now).await?;
        let server = tx.begin_service(&server.id).await?;
        Ok(Assignment::new(&ticket, &server, now))
    }
}

async fn load_ticket(tx: &mut dyn CounterTransaction, id: &str) -> Result<Ticket> {
    tx.find_ticket(&id.to_string())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", id)))
}

pub(crate) async fn load_server(tx: &mut dyn CounterTransaction, id: &str) -> Result<Server> {
    tx.find_server(&id.to_string())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Server {} not found", id)))
}

fn assigned_server(ticket: &Ticket) -> Result<String> {
    ticket.server_id.clone().ok_or_else(|| {
        AppError::InvalidState(format!(
            "Ticket {} is {} without an assigned server",
            ticket.id, ticket.status
        ))
    })
}

fn rejected(operation: &'static str, err: DomainError) -> AppError {
    warn!(operation, error = %err, "Precondition failed, transaction aborted");
    AppError::Domain(err)
}
