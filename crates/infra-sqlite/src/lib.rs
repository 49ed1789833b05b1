// Walkin Infrastructure - SQLite Adapter
// Implements: TicketLedger, ServerRoster, TransactionalCounterStore

mod connection;
mod error;
mod ledger;
mod migration;
mod roster;
mod store;
mod transaction;

pub use connection::create_pool;
pub use migration::run_migrations;
pub use store::SqliteCounterStore;
pub use transaction::SqliteCounterTransaction;

// Note: sqlx::Error conversion is handled by map_sqlx_error
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
