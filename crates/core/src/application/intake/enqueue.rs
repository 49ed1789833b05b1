// Enqueue Use Case

use crate::domain::{Ticket, TicketId};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, TimeProvider, TransactionalCounterStore};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Maximum length of ids and display names supplied by the front desk
pub const MAX_NAME_LEN: usize = 128;

/// Maximum length of a free-text note
pub const MAX_NOTE_LEN: usize = 1000;

/// Enqueue request (validated records from the front desk)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueRequest {
    pub requester_id: String,
    pub requester_name: String,
    pub service_id: String,
    pub service_name: String,

    #[serde(default)]
    pub note: Option<String>,
}

fn validate_field(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "{} too long (max {} characters)",
            field, MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// Validate an enqueue request before anything touches the store
pub fn validate_request(req: &EnqueueRequest) -> Result<()> {
    validate_field("requester_id", &req.requester_id)?;
    validate_field("requester_name", &req.requester_name)?;
    validate_field("service_id", &req.service_id)?;
    validate_field("service_name", &req.service_name)?;

    if let Some(note) = &req.note {
        if note.chars().count() > MAX_NOTE_LEN {
            return Err(AppError::Validation(format!(
                "note too long (max {} characters)",
                MAX_NOTE_LEN
            )));
        }
    }
    Ok(())
}

/// Execute enqueue use case (with transaction for atomicity)
///
/// # Arguments
///
/// * `store` - Transactional counter store
/// * `id_provider` - ID generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `req` - Enqueue request
pub async fn execute(
    store: &dyn TransactionalCounterStore,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: EnqueueRequest,
) -> Result<TicketId> {
    validate_request(&req)?;

    let mut tx = store.begin_transaction().await?;

    let ticket_id = id_provider.generate_id();
    let created_at = time_provider.now_millis();

    let mut ticket = Ticket::new(
        ticket_id.clone(),
        created_at,
        req.requester_id,
        req.requester_name,
        req.service_id,
        req.service_name,
    );
    ticket.note = req.note.filter(|n| !n.trim().is_empty());

    tx.insert_ticket(&ticket).await?;
    tx.commit().await?;

    info!(
        ticket_id = %ticket_id,
        requester_id = %ticket.requester_id,
        service_id = %ticket.service_id,
        "Ticket enqueued"
    );
    Ok(ticket_id)
}
