//! Walk-in Counter Daemon - Main Entry Point
//! JSON-RPC server + auto dispatcher + daily reset scheduler

mod config;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use config::{DaemonConfig, LogFormat};
use telemetry::BoxedLayer;

// Import workspace crates
use walkin_api_rpc::{RpcHandler, RpcServer, RpcServerConfig};
use walkin_core::application::{
    shutdown_channel, AutoDispatcher, ConsistencyAudit, DailyResetScheduler,
    DistributionCoordinator, IntakeService, RosterService,
};
use walkin_core::port::id_provider::UuidProvider;
use walkin_core::port::time_provider::SystemTimeProvider;
use walkin_infra_sqlite::{create_pool, run_migrations, SqliteCounterStore};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env()?;

    // 2. Initialize logging (held guard flushes the file writer on exit)
    let _log_guard = init_logging(&config)?;

    info!("Walk-in counter daemon v{} starting...", VERSION);

    // 3. Initialize database
    if let Some(parent) = std::path::Path::new(&config.db_path).parent() {
        if !parent.as_os_str().is_empty() && !config.db_path.contains(":memory:") {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    info!(db_path = %config.db_path, "Initializing database...");
    let pool = create_pool(&config.db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);
    let store = Arc::new(SqliteCounterStore::new(pool.clone()));

    let intake = Arc::new(IntakeService::new(
        store.clone(),
        store.clone(),
        id_provider.clone(),
        time_provider.clone(),
    ));
    let coordinator = Arc::new(DistributionCoordinator::new(
        store.clone(),
        time_provider.clone(),
    ));
    let roster_service = Arc::new(
        RosterService::new(
            store.clone(),
            store.clone(),
            id_provider.clone(),
            time_provider.clone(),
        )
        .with_utc_offset_minutes(config.utc_offset_minutes),
    );
    let audit = Arc::new(ConsistencyAudit::new(store.clone(), store.clone()));

    // 5. Startup consistency audit
    match audit.run().await {
        Ok(report) if report.is_consistent() => info!(
            tickets_in_service = report.tickets_in_service,
            servers_present = report.servers_present,
            "Startup audit passed"
        ),
        Ok(report) => warn!(
            violations = report.violations.len(),
            "Startup audit found inconsistencies"
        ),
        Err(e) => error!(error = %e, "Startup audit failed"),
    }

    // 6. Start background tasks
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let dispatcher_handle = match config.auto_dispatch_interval {
        Some(interval) => {
            info!("Starting auto dispatcher...");
            let dispatcher = AutoDispatcher::new(coordinator.clone()).with_interval(interval);
            let token = shutdown_rx.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = dispatcher.run(token).await {
                    error!(error = ?e, "Auto dispatcher failed");
                }
            }))
        }
        None => {
            info!("Auto dispatcher disabled (WALKIN_AUTO_DISPATCH_MS=0)");
            None
        }
    };

    info!("Starting daily reset scheduler...");
    let reset_scheduler = DailyResetScheduler::new(roster_service.clone())
        .with_check_interval(config.reset_check_interval);
    let reset_handle = tokio::spawn(reset_scheduler.run(shutdown_rx));

    // 7. Start JSON-RPC server
    let handler = RpcHandler::new(
        intake,
        coordinator,
        roster_service,
        audit,
        store.clone(),
        store,
    );
    let rpc_config = RpcServerConfig {
        host: config.rpc_host.clone(),
        port: config.rpc_port,
    };
    let (rpc_addr, rpc_handle) = RpcServer::new(rpc_config, handler)
        .start()
        .await
        .context("RPC server start failed")?;

    info!(rpc_addr = %rpc_addr, "System ready. Press Ctrl+C to shutdown");

    // 8. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 9. Graceful shutdown
    shutdown_tx.shutdown();
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    if let Some(handle) = dispatcher_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(5), handle).await;
    }
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), reset_handle).await;
    pool.close().await;

    info!("Shutdown complete.");

    Ok(())
}

/// Console output (pretty or JSON), optional daily log file, optional OTLP export
fn init_logging(config: &DaemonConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("walkin=info"))
        .context("Failed to create env filter")?;

    let mut layers: Vec<BoxedLayer> = Vec::new();

    match config.log_format {
        // Production: JSON structured logging
        LogFormat::Json => layers.push(fmt::layer().json().boxed()),
        // Development: Pretty formatting with colors
        LogFormat::Pretty => layers.push(fmt::layer().pretty().boxed()),
    }

    let guard = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "walkin-daemon.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            );
            Some(guard)
        }
        None => None,
    };

    if let Some(otel) = telemetry::telemetry_layer()? {
        layers.push(otel);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
