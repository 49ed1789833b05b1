// Transaction port for atomic operations

use crate::error::Result;
use crate::port::{LedgerTransaction, RosterTransaction};
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
///
/// Dropping a transaction without committing rolls it back.
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// One transaction spanning both the ticket ledger and the server roster
pub trait CounterTransaction: Transaction + LedgerTransaction + RosterTransaction {}

impl<T> CounterTransaction for T where T: Transaction + LedgerTransaction + RosterTransaction {}

/// Store that can open counter transactions
///
/// Implementations must serialize concurrent transactions on the rows they
/// touch: a second coordinator never observes a half-applied transition.
#[async_trait]
pub trait TransactionalCounterStore: Send + Sync {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn CounterTransaction>>;
}
