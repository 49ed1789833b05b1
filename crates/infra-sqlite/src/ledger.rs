// SQLite TicketLedger Implementation

use crate::error::map_sqlx_error;
use crate::store::SqliteCounterStore;
use async_trait::async_trait;
use sqlx::{Executor, Sqlite};
use walkin_core::domain::{Ticket, TicketId, TicketStatus};
use walkin_core::error::{AppError, Result};
use walkin_core::port::TicketLedger;

pub(crate) async fn fetch_ticket<'e, E>(executor: E, id: &str) -> Result<Option<Ticket>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, TicketRow>("SELECT * FROM tickets WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(map_sqlx_error)?;

    row.map(TicketRow::into_ticket).transpose()
}

pub(crate) async fn fetch_by_status<'e, E>(
    executor: E,
    status: TicketStatus,
    limit: Option<i64>,
) -> Result<Vec<Ticket>>
where
    E: Executor<'e, Database = Sqlite>,
{
    // rowid breaks created_at ties in insertion order
    let rows: Vec<TicketRow> = sqlx::query_as(
        r#"
        SELECT * FROM tickets
        WHERE status = ?
        ORDER BY created_at ASC, rowid ASC
        LIMIT ?
        "#,
    )
    .bind(status.as_str())
    // SQLite treats a negative LIMIT as "no limit"
    .bind(limit.unwrap_or(-1))
    .fetch_all(executor)
    .await
    .map_err(map_sqlx_error)?;

    rows.into_iter().map(TicketRow::into_ticket).collect()
}

#[async_trait]
impl TicketLedger for SqliteCounterStore {
    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>> {
        fetch_ticket(self.pool(), id).await
    }

    async fn list_waiting(&self) -> Result<Vec<Ticket>> {
        fetch_by_status(self.pool(), TicketStatus::Waiting, None).await
    }

    async fn find_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>> {
        fetch_by_status(self.pool(), status, None).await
    }

    async fn count_by_status(&self, status: TicketStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(count)
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TicketRow {
    id: String,
    requester_id: String,
    requester_name: String,
    service_id: String,
    service_name: String,
    server_id: Option<String>,
    status: String,
    created_at: i64,
    started_at: Option<i64>,
    finished_at: Option<i64>,
    cancelled_at: Option<i64>,
    charge: Option<i64>,
    note: Option<String>,
    cancel_reason: Option<String>,
}

impl TicketRow {
    pub(crate) fn into_ticket(self) -> Result<Ticket> {
        let status: TicketStatus = self.status.parse().map_err(|e| {
            AppError::Database(format!("Corrupt ticket row {}: {}", self.id, e))
        })?;

        Ok(Ticket {
            id: self.id,
            requester_id: self.requester_id,
            requester_name: self.requester_name,
            service_id: self.service_id,
            service_name: self.service_name,
            server_id: self.server_id,
            status,
            created_at: self.created_at,
            started_at: self.started_at,
            finished_at: self.finished_at,
            cancelled_at: self.cancelled_at,
            charge: self.charge,
            note: self.note,
            cancel_reason: self.cancel_reason,
        })
    }
}
