// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod server_roster;
pub mod ticket_ledger;
pub mod time_provider;
pub mod transaction;

// Re-exports
pub use id_provider::IdProvider;
pub use server_roster::{RosterTransaction, ServerRoster};
pub use ticket_ledger::{LedgerTransaction, TicketLedger};
pub use time_provider::TimeProvider;
pub use transaction::{CounterTransaction, Transaction, TransactionalCounterStore};
