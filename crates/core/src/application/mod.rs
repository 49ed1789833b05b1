// Application Layer - Use Cases and Business Logic

pub mod audit;
pub mod coordinator;
pub mod daily_reset;
pub mod dispatcher;
pub mod intake;
pub mod roster;
pub mod selector;
pub mod stats;

// Re-exports
pub use audit::{AuditReport, ConsistencyAudit};
pub use coordinator::DistributionCoordinator;
pub use daily_reset::DailyResetScheduler;
pub use dispatcher::{shutdown_channel, AutoDispatcher, ShutdownSender, ShutdownToken};
pub use intake::{EnqueueRequest, IntakeService};
pub use roster::RosterService;
pub use stats::CounterStats;
