// SQLite Transaction Implementation
//
// Mutators load the row, run the domain transition on it and write it back
// with a conditional UPDATE guarded by the prior status.

use crate::error::map_sqlx_error;
use crate::ledger::{fetch_by_status, fetch_ticket};
use crate::roster::{fetch_server, fetch_servers_by_status, ServerRow};
use async_trait::async_trait;
use sqlx::{Sqlite, Transaction as SqlxTransaction};
use walkin_core::domain::{Charge, Server, ServerId, ServerStatus, Ticket, TicketId, TicketStatus};
use walkin_core::error::{AppError, Result};
use walkin_core::port::{LedgerTransaction, RosterTransaction, Transaction};

pub struct SqliteCounterTransaction {
    tx: SqlxTransaction<'static, Sqlite>,
}

impl SqliteCounterTransaction {
    pub fn new(tx: SqlxTransaction<'static, Sqlite>) -> Self {
        Self { tx }
    }

    async fn require_ticket(&mut self, id: &str) -> Result<Ticket> {
        fetch_ticket(&mut *self.tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", id)))
    }

    async fn require_server(&mut self, id: &str) -> Result<Server> {
        fetch_server(&mut *self.tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Server {} not found", id)))
    }

    async fn write_ticket(&mut self, ticket: &Ticket, expected: TicketStatus) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET server_id = ?, status = ?, started_at = ?, finished_at = ?,
                cancelled_at = ?, charge = ?, note = ?, cancel_reason = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(&ticket.server_id)
        .bind(ticket.status.as_str())
        .bind(ticket.started_at)
        .bind(ticket.finished_at)
        .bind(ticket.cancelled_at)
        .bind(ticket.charge)
        .bind(&ticket.note)
        .bind(&ticket.cancel_reason)
        .bind(&ticket.id)
        .bind(expected.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Ticket {} is no longer {}",
                ticket.id, expected
            )));
        }
        Ok(())
    }

    async fn write_server(&mut self, server: &Server, expected: ServerStatus) -> Result<Server> {
        let row = sqlx::query_as::<_, ServerRow>(
            r#"
            UPDATE servers
            SET name = ?, status = ?, arrival_rank = ?, daily_served_count = ?, active = ?
            WHERE id = ? AND status = ?
            RETURNING *
            "#,
        )
        .bind(&server.name)
        .bind(server.status.as_str())
        .bind(server.arrival_rank)
        .bind(server.daily_served_count)
        .bind(if server.active { 1i64 } else { 0i64 })
        .bind(&server.id)
        .bind(expected.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => row.into_server(),
            None => Err(AppError::Conflict(format!(
                "Server {} is no longer {}",
                server.id, expected
            ))),
        }
    }
}

#[async_trait]
impl Transaction for SqliteCounterTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl LedgerTransaction for SqliteCounterTransaction {
    async fn insert_ticket(&mut self, ticket: &Ticket) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tickets (
                id, requester_id, requester_name, service_id, service_name,
                server_id, status, created_at, started_at, finished_at,
                cancelled_at, charge, note, cancel_reason
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&ticket.id)
        .bind(&ticket.requester_id)
        .bind(&ticket.requester_name)
        .bind(&ticket.service_id)
        .bind(&ticket.service_name)
        .bind(&ticket.server_id)
        .bind(ticket.status.as_str())
        .bind(ticket.created_at)
        .bind(ticket.started_at)
        .bind(ticket.finished_at)
        .bind(ticket.cancelled_at)
        .bind(ticket.charge)
        .bind(&ticket.note)
        .bind(&ticket.cancel_reason)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_ticket(&mut self, id: &TicketId) -> Result<Option<Ticket>> {
        fetch_ticket(&mut *self.tx, id).await
    }

    async fn next_waiting(&mut self) -> Result<Option<Ticket>> {
        let mut oldest = fetch_by_status(&mut *self.tx, TicketStatus::Waiting, Some(1)).await?;
        Ok(oldest.pop())
    }

    async fn mark_in_service(
        &mut self,
        id: &TicketId,
        server_id: &str,
        now_millis: i64,
    ) -> Result<Ticket> {
        let mut ticket = self.require_ticket(id).await?;
        let prior = ticket.status;
        ticket.start(server_id, now_millis)?;
        self.write_ticket(&ticket, prior).await?;
        Ok(ticket)
    }

    async fn mark_finished(
        &mut self,
        id: &TicketId,
        now_millis: i64,
        charge: Option<Charge>,
        note: Option<String>,
    ) -> Result<Ticket> {
        let mut ticket = self.require_ticket(id).await?;
        let prior = ticket.status;
        ticket.finish(now_millis, charge, note)?;
        self.write_ticket(&ticket, prior).await?;
        Ok(ticket)
    }

    async fn mark_cancelled(
        &mut self,
        id: &TicketId,
        now_millis: i64,
        reason: Option<String>,
    ) -> Result<Ticket> {
        let mut ticket = self.require_ticket(id).await?;
        let prior = ticket.status;
        ticket.cancel(now_millis, reason)?;
        self.write_ticket(&ticket, prior).await?;
        Ok(ticket)
    }
}

#[async_trait]
impl RosterTransaction for SqliteCounterTransaction {
    async fn insert_server(&mut self, server: &Server) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO servers (
                id, name, status, arrival_rank, daily_served_count, active, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&server.id)
        .bind(&server.name)
        .bind(server.status.as_str())
        .bind(server.arrival_rank)
        .bind(server.daily_served_count)
        .bind(if server.active { 1i64 } else { 0i64 })
        .bind(server.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_server(&mut self, id: &ServerId) -> Result<Option<Server>> {
        fetch_server(&mut *self.tx, id).await
    }

    async fn idle_servers(&mut self) -> Result<Vec<Server>> {
        fetch_servers_by_status(&mut *self.tx, ServerStatus::Idle).await
    }

    async fn max_arrival_rank(&mut self) -> Result<i64> {
        let max: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(arrival_rank), 0) FROM servers WHERE status <> 'ABSENT'",
        )
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(max)
    }

    async fn check_in(&mut self, id: &ServerId, rank: i64) -> Result<Server> {
        let mut server = self.require_server(id).await?;
        let prior = server.status;
        server.check_in(rank)?;
        self.write_server(&server, prior).await
    }

    async fn check_out(&mut self, id: &ServerId) -> Result<Server> {
        let mut server = self.require_server(id).await?;
        let prior = server.status;
        server.check_out()?;
        self.write_server(&server, prior).await
    }

    async fn begin_service(&mut self, id: &ServerId) -> Result<Server> {
        let mut server = self.require_server(id).await?;
        let prior = server.status;
        server.begin_service()?;
        self.write_server(&server, prior).await
    }

    async fn end_service(&mut self, id: &ServerId, completed: bool) -> Result<Server> {
        let mut server = self.require_server(id).await?;
        server.end_service(completed)?;

        // Increment in the statement itself, never as a read-then-write of count + 1
        let row = sqlx::query_as::<_, ServerRow>(
            r#"
            UPDATE servers
            SET status = 'IDLE', daily_served_count = daily_served_count + ?
            WHERE id = ? AND status = 'SERVING'
            RETURNING *
            "#,
        )
        .bind(if completed { 1i64 } else { 0i64 })
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => row.into_server(),
            None => Err(AppError::Conflict(format!(
                "Server {} is no longer SERVING",
                id
            ))),
        }
    }

    async fn set_active(&mut self, id: &ServerId, active: bool) -> Result<Server> {
        let mut server = self.require_server(id).await?;
        let prior = server.status;
        server.active = active;
        self.write_server(&server, prior).await
    }

    async fn count_serving(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM servers WHERE status = 'SERVING'")
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn reset_daily(&mut self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE servers
            SET status = 'ABSENT', arrival_rank = 0, daily_served_count = 0
            WHERE status <> 'ABSENT' OR arrival_rank <> 0 OR daily_served_count <> 0
            "#,
        )
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn last_reset_day(&mut self) -> Result<Option<i64>> {
        let day: Option<i64> =
            sqlx::query_scalar("SELECT last_reset_day FROM counter_state WHERE id = 1")
                .fetch_one(&mut *self.tx)
                .await
                .map_err(map_sqlx_error)?;

        Ok(day)
    }

    async fn record_reset_day(&mut self, day: i64) -> Result<()> {
        sqlx::query("UPDATE counter_state SET last_reset_day = ? WHERE id = 1")
            .bind(day)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{create_pool, run_migrations, SqliteCounterStore};
    use walkin_core::domain::{DomainError, Server, ServerStatus, Ticket, TicketStatus};
    use walkin_core::error::AppError;
    use walkin_core::port::{ServerRoster, TicketLedger, TransactionalCounterStore};

    async fn setup_store() -> SqliteCounterStore {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteCounterStore::new(pool)
    }

    fn ticket(id: &str, created_at: i64) -> Ticket {
        Ticket::new(id, created_at, "client-1", "Ana", "svc-1", "Haircut")
    }

    async fn seed_idle_server(store: &SqliteCounterStore, id: &str, rank: i64) {
        let mut tx = store.begin_transaction().await.unwrap();
        tx.insert_server(&Server::new(id, 0, id.to_uppercase()))
            .await
            .unwrap();
        tx.check_in(&id.to_string(), rank).await.unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_and_find_ticket() {
        let store = setup_store().await;

        let mut tx = store.begin_transaction().await.unwrap();
        tx.insert_ticket(&ticket("t-1", 1_000)).await.unwrap();
        tx.commit().await.unwrap();

        let found = TicketLedger::find_by_id(&store, &"t-1".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, ticket("t-1", 1_000));
    }

    #[tokio::test]
    async fn test_next_waiting_is_fifo_with_insertion_tiebreak() {
        let store = setup_store().await;

        let mut tx = store.begin_transaction().await.unwrap();
        tx.insert_ticket(&ticket("late", 2_000)).await.unwrap();
        tx.insert_ticket(&ticket("tie-first", 1_000)).await.unwrap();
        tx.insert_ticket(&ticket("tie-second", 1_000)).await.unwrap();

        let next = tx.next_waiting().await.unwrap().unwrap();
        assert_eq!(next.id, "tie-first");
        tx.commit().await.unwrap();

        let waiting: Vec<String> = store
            .list_waiting()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(waiting, vec!["tie-first", "tie-second", "late"]);
    }

    #[tokio::test]
    async fn test_mark_unknown_ticket_is_not_found() {
        let store = setup_store().await;

        let mut tx = store.begin_transaction().await.unwrap();
        let err = tx
            .mark_in_service(&"missing".to_string(), "s-1", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_finish_waiting_ticket_is_invalid_transition() {
        let store = setup_store().await;

        let mut tx = store.begin_transaction().await.unwrap();
        tx.insert_ticket(&ticket("t-1", 1)).await.unwrap();
        let err = tx
            .mark_finished(&"t-1".to_string(), 2, None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Domain(DomainError::InvalidStateTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_end_service_counts_only_completions() {
        let store = setup_store().await;
        seed_idle_server(&store, "s-1", 1).await;
        let id = "s-1".to_string();

        let mut tx = store.begin_transaction().await.unwrap();
        tx.begin_service(&id).await.unwrap();
        let server = tx.end_service(&id, true).await.unwrap();
        assert_eq!(server.status, ServerStatus::Idle);
        assert_eq!(server.daily_served_count, 1);

        tx.begin_service(&id).await.unwrap();
        let server = tx.end_service(&id, false).await.unwrap();
        assert_eq!(server.daily_served_count, 1);
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let store = setup_store().await;

        {
            let mut tx = store.begin_transaction().await.unwrap();
            tx.insert_ticket(&ticket("t-1", 1)).await.unwrap();
            // dropped without commit
        }

        assert!(TicketLedger::find_by_id(&store, &"t-1".to_string())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_one_in_service_ticket_per_server_index() {
        let store = setup_store().await;
        seed_idle_server(&store, "s-1", 1).await;

        let mut tx = store.begin_transaction().await.unwrap();
        tx.insert_ticket(&ticket("a", 1)).await.unwrap();
        tx.insert_ticket(&ticket("b", 2)).await.unwrap();
        tx.mark_in_service(&"a".to_string(), "s-1", 3).await.unwrap();

        // Bypassing the coordinator still cannot double-book the server
        let err = tx
            .mark_in_service(&"b".to_string(), "s-1", 4)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_max_rank_ignores_absent_servers() {
        let store = setup_store().await;
        seed_idle_server(&store, "s-1", 1).await;
        seed_idle_server(&store, "s-2", 2).await;

        let mut tx = store.begin_transaction().await.unwrap();
        assert_eq!(tx.max_arrival_rank().await.unwrap(), 2);
        tx.check_out(&"s-2".to_string()).await.unwrap();
        assert_eq!(tx.max_arrival_rank().await.unwrap(), 1);
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_reset_daily_and_reset_day_bookkeeping() {
        let store = setup_store().await;
        seed_idle_server(&store, "s-1", 1).await;
        seed_idle_server(&store, "s-2", 2).await;

        let mut tx = store.begin_transaction().await.unwrap();
        tx.insert_server(&Server::new("s-3", 0, "Absent")).await.unwrap();
        assert_eq!(tx.last_reset_day().await.unwrap(), None);

        assert_eq!(tx.reset_daily().await.unwrap(), 2);
        tx.record_reset_day(20_000).await.unwrap();
        assert_eq!(tx.last_reset_day().await.unwrap(), Some(20_000));
        tx.commit().await.unwrap();

        assert_eq!(
            ServerRoster::count_by_status(&store, ServerStatus::Absent)
                .await
                .unwrap(),
            3
        );
        assert_eq!(
            TicketLedger::count_by_status(&store, TicketStatus::Waiting)
                .await
                .unwrap(),
            0
        );
    }
}
