// SQLite ServerRoster Implementation

use crate::error::map_sqlx_error;
use crate::store::SqliteCounterStore;
use async_trait::async_trait;
use sqlx::{Executor, Sqlite};
use walkin_core::domain::{Server, ServerId, ServerStatus};
use walkin_core::error::{AppError, Result};
use walkin_core::port::ServerRoster;

pub(crate) async fn fetch_server<'e, E>(executor: E, id: &str) -> Result<Option<Server>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, ServerRow>("SELECT * FROM servers WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(map_sqlx_error)?;

    row.map(ServerRow::into_server).transpose()
}

pub(crate) async fn fetch_servers_by_status<'e, E>(
    executor: E,
    status: ServerStatus,
) -> Result<Vec<Server>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows: Vec<ServerRow> = sqlx::query_as(
        r#"
        SELECT * FROM servers
        WHERE status = ?
        ORDER BY arrival_rank ASC, name ASC
        "#,
    )
    .bind(status.as_str())
    .fetch_all(executor)
    .await
    .map_err(map_sqlx_error)?;

    rows.into_iter().map(ServerRow::into_server).collect()
}

#[async_trait]
impl ServerRoster for SqliteCounterStore {
    async fn find_by_id(&self, id: &ServerId) -> Result<Option<Server>> {
        fetch_server(self.pool(), id).await
    }

    async fn list_all(&self) -> Result<Vec<Server>> {
        let rows: Vec<ServerRow> =
            sqlx::query_as("SELECT * FROM servers ORDER BY arrival_rank ASC, name ASC")
                .fetch_all(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        rows.into_iter().map(ServerRow::into_server).collect()
    }

    async fn find_by_status(&self, status: ServerStatus) -> Result<Vec<Server>> {
        fetch_servers_by_status(self.pool(), status).await
    }

    async fn count_by_status(&self, status: ServerStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM servers WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(count)
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ServerRow {
    id: String,
    name: String,
    status: String,
    arrival_rank: i64,
    daily_served_count: i64,
    active: i64, // SQLite boolean as integer
    created_at: i64,
}

impl ServerRow {
    pub(crate) fn into_server(self) -> Result<Server> {
        let status: ServerStatus = self.status.parse().map_err(|e| {
            AppError::Database(format!("Corrupt server row {}: {}", self.id, e))
        })?;

        Ok(Server {
            id: self.id,
            name: self.name,
            status,
            arrival_rank: self.arrival_rank,
            daily_served_count: self.daily_served_count,
            active: self.active != 0,
            created_at: self.created_at,
        })
    }
}
