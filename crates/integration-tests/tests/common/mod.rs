//! Shared fixture: a fully wired counter over SQLite with a deterministic clock

#![allow(dead_code)]

use std::sync::Arc;
use walkin_core::application::{
    ConsistencyAudit, DistributionCoordinator, EnqueueRequest, IntakeService, RosterService,
};
use walkin_core::domain::{Server, ServerId, TicketId};
use walkin_core::port::id_provider::SequentialIdProvider;
use walkin_core::port::time_provider::FixedTimeProvider;
use walkin_core::port::ServerRoster;
use walkin_infra_sqlite::{create_pool, run_migrations, SqliteCounterStore};

/// 2026-03-02 09:00:00 UTC
pub const OPENING_MILLIS: i64 = 1_772_442_000_000;

pub struct Counter {
    pub store: Arc<SqliteCounterStore>,
    pub clock: Arc<FixedTimeProvider>,
    pub intake: Arc<IntakeService>,
    pub coordinator: Arc<DistributionCoordinator>,
    pub roster: Arc<RosterService>,
    pub audit: Arc<ConsistencyAudit>,
}

impl Counter {
    pub async fn in_memory() -> Self {
        Self::open("sqlite::memory:").await
    }

    /// File-backed database under the system temp dir (multi-connection pool)
    pub async fn temp_file() -> (Self, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("walkin-test-{}.db", uuid::Uuid::new_v4()));
        let counter = Self::open(&path.to_string_lossy()).await;
        (counter, path)
    }

    /// In-memory counter whose clock never moves on its own
    pub async fn frozen() -> Self {
        Self::open_with_clock("sqlite::memory:", FixedTimeProvider::new(OPENING_MILLIS)).await
    }

    pub async fn open(url: &str) -> Self {
        // Every read of the clock moves it forward, so enqueue order is strict
        Self::open_with_clock(url, FixedTimeProvider::stepping(OPENING_MILLIS, 1_000)).await
    }

    pub async fn open_with_clock(url: &str, clock: FixedTimeProvider) -> Self {
        let pool = create_pool(url).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let store = Arc::new(SqliteCounterStore::new(pool));
        let clock = Arc::new(clock);

        let intake = Arc::new(IntakeService::new(
            store.clone(),
            store.clone(),
            Arc::new(SequentialIdProvider::new("t")),
            clock.clone(),
        ));
        let coordinator = Arc::new(DistributionCoordinator::new(store.clone(), clock.clone()));
        let roster = Arc::new(RosterService::new(
            store.clone(),
            store.clone(),
            Arc::new(SequentialIdProvider::new("s")),
            clock.clone(),
        ));
        let audit = Arc::new(ConsistencyAudit::new(store.clone(), store.clone()));

        Self {
            store,
            clock,
            intake,
            coordinator,
            roster,
            audit,
        }
    }

    pub async fn enqueue(&self, client: &str, service: &str) -> TicketId {
        self.intake
            .enqueue(EnqueueRequest {
                requester_id: format!("client-{}", client.to_lowercase()),
                requester_name: client.to_string(),
                service_id: format!("svc-{}", service.to_lowercase()),
                service_name: service.to_string(),
                note: None,
            })
            .await
            .unwrap()
    }

    /// Register and check in a server; returns its id
    pub async fn staff(&self, name: &str) -> ServerId {
        let server = self.roster.register_server(name).await.unwrap();
        self.roster.check_in(&server.id).await.unwrap();
        server.id
    }

    pub async fn server(&self, id: &str) -> Server {
        ServerRoster::find_by_id(self.store.as_ref(), &id.to_string())
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn assert_consistent(&self) {
        let report = self.audit.run().await.unwrap();
        assert!(report.is_consistent(), "audit violations: {:?}", report.violations);
        assert_eq!(report.tickets_in_service, report.servers_serving);
    }
}
