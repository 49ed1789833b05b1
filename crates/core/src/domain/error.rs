// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid ticket state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Ticket {ticket_id} is not waiting (status: {status})")]
    TicketNotWaiting { ticket_id: String, status: String },

    #[error("Ticket {ticket_id} is not in service (status: {status})")]
    NotInService { ticket_id: String, status: String },

    #[error("Ticket {0} is already finished")]
    AlreadyFinished(String),

    #[error("Server {server_id} is not available (status: {status})")]
    ServerNotAvailable { server_id: String, status: String },

    #[error("Server {0} is inactive")]
    ServerInactive(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
