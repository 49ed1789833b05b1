// Domain Layer - Pure business logic and entities

pub mod assignment;
pub mod error;
pub mod server;
pub mod ticket;

// Re-exports
pub use assignment::{Assignment, DistributionOutcome};
pub use error::DomainError;
pub use server::{Server, ServerBoard, ServerId, ServerStatus};
pub use ticket::{Charge, Ticket, TicketId, TicketStatus};
