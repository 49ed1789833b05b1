//! RPC Error Types
//!
//! Maps application errors to stable JSON-RPC error codes. Every failed
//! precondition keeps its own code so operators see exactly what was refused.

use jsonrpsee::types::ErrorObjectOwned;
use walkin_core::domain::DomainError;
use walkin_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const CONFLICT: i32 = 4002;

    // Status preconditions
    pub const INVALID_TRANSITION: i32 = 4010;
    pub const TICKET_NOT_WAITING: i32 = 4011;
    pub const NOT_IN_SERVICE: i32 = 4012;
    pub const ALREADY_FINISHED: i32 = 4013;
    pub const SERVER_NOT_AVAILABLE: i32 = 4014;
    pub const SERVER_INACTIVE: i32 = 4015;

    pub const INTERNAL_ERROR: i32 = 5000;
    pub const DB_ERROR: i32 = 5001;
    pub const SYSTEM_ERROR: i32 = 5002;
}

/// Error code for a domain precondition failure
pub fn domain_code(err: &DomainError) -> i32 {
    match err {
        DomainError::InvalidStateTransition { .. } => code::INVALID_TRANSITION,
        DomainError::TicketNotWaiting { .. } => code::TICKET_NOT_WAITING,
        DomainError::NotInService { .. } => code::NOT_IN_SERVICE,
        DomainError::AlreadyFinished(_) => code::ALREADY_FINISHED,
        DomainError::ServerNotAvailable { .. } => code::SERVER_NOT_AVAILABLE,
        DomainError::ServerInactive(_) => code::SERVER_INACTIVE,
        DomainError::ValidationError(_) => code::VALIDATION_ERROR,
    }
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    match err {
        AppError::Validation(msg) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg, None::<()>)
        }
        AppError::NotFound(msg) => ErrorObjectOwned::owned(code::NOT_FOUND, msg, None::<()>),
        AppError::Conflict(msg) => ErrorObjectOwned::owned(code::CONFLICT, msg, None::<()>),
        AppError::InvalidState(msg) => ErrorObjectOwned::owned(code::CONFLICT, msg, None::<()>),
        AppError::Domain(e) => ErrorObjectOwned::owned(domain_code(&e), e.to_string(), None::<()>),
        AppError::Database(msg) => ErrorObjectOwned::owned(code::DB_ERROR, msg, None::<()>),
        AppError::Io(e) => ErrorObjectOwned::owned(code::SYSTEM_ERROR, e.to_string(), None::<()>),
        AppError::Serialization(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        AppError::Config(msg) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>),
        AppError::Internal(msg) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>),
    }
}
