// SQLite counter store: pool-level reads and transaction factory

use crate::error::map_sqlx_error;
use crate::SqliteCounterTransaction;
use async_trait::async_trait;
use sqlx::SqlitePool;
use walkin_core::error::Result;
use walkin_core::port::{CounterTransaction, TransactionalCounterStore};

/// Ticket ledger + server roster backed by one SQLite database
#[derive(Clone)]
pub struct SqliteCounterStore {
    pool: SqlitePool,
}

impl SqliteCounterStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TransactionalCounterStore for SqliteCounterStore {
    async fn begin_transaction(&self) -> Result<Box<dyn CounterTransaction>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // Take the write lock before any read: concurrent coordinators queue
        // here (bounded by busy_timeout) instead of hitting SQLITE_BUSY_SNAPSHOT
        // on a read-then-write upgrade
        sqlx::query("UPDATE counter_state SET generation = generation + 1 WHERE id = 1")
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(Box::new(SqliteCounterTransaction::new(tx)))
    }
}
