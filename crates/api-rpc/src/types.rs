//! RPC Request/Response Types
//!
//! Method parameters and results. Domain entities (`Ticket`, `Server`,
//! `Assignment`, `DistributionOutcome`) are returned as-is.

use serde::{Deserialize, Serialize};
use walkin_core::application::{AuditReport, CounterStats};
use walkin_core::domain::{Server, ServerBoard, Ticket};

/// ticket.enqueue.v1 - Add a client to the waiting line
#[derive(Debug, Deserialize)]
pub struct EnqueueTicketRequest {
    pub requester_id: String,
    pub requester_name: String,
    pub service_id: String,
    pub service_name: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueTicketResponse {
    pub ticket_id: String,
    pub status: String,
}

/// ticket.get.v1
#[derive(Debug, Deserialize)]
pub struct TicketRequest {
    pub ticket_id: String,
}

/// ticket.list_waiting.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitingListResponse {
    pub count: usize,
    pub tickets: Vec<Ticket>,
}

/// ticket.complete.v1 - Finish an in-service ticket
#[derive(Debug, Deserialize)]
pub struct CompleteTicketRequest {
    pub ticket_id: String,
    /// Amount charged, in cents
    #[serde(default)]
    pub charge: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

/// ticket.cancel.v1
#[derive(Debug, Deserialize)]
pub struct CancelTicketRequest {
    pub ticket_id: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// distribute.forced.v1 - Operator override
#[derive(Debug, Deserialize)]
pub struct ForcedDistributionRequest {
    pub ticket_id: String,
    pub server_id: String,
}

/// server.register.v1
#[derive(Debug, Deserialize)]
pub struct RegisterServerRequest {
    pub name: String,
}

/// server.set_active.v1
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub server_id: String,
    pub active: bool,
}

/// server.check_in.v1 / server.check_out.v1
#[derive(Debug, Deserialize)]
pub struct ServerRequest {
    pub server_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub server_id: String,
    pub arrival_rank: i64,
}

/// server.list.v1
#[derive(Debug, Clone, Serialize)]
pub struct ServerListResponse {
    #[serde(flatten)]
    pub board: ServerBoard,
    /// Idle server the next automatic distribution would pick
    pub next_available: Option<Server>,
}

/// admin.reset_daily.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetDailyResponse {
    pub servers_reset: u64,
}

/// admin.stats.v1
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub counts: CounterStats,
    pub uptime_seconds: i64,
}

/// admin.audit.v1
#[derive(Debug, Clone, Serialize)]
pub struct AuditResponse {
    pub consistent: bool,
    #[serde(flatten)]
    pub report: AuditReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_optional_fields_default_to_none() {
        let req: CompleteTicketRequest =
            serde_json::from_value(json!({ "ticket_id": "t-1" })).unwrap();
        assert_eq!(req.charge, None);
        assert_eq!(req.note, None);

        let req: EnqueueTicketRequest = serde_json::from_value(json!({
            "requester_id": "c-1",
            "requester_name": "Ana",
            "service_id": "svc-1",
            "service_name": "Haircut",
        }))
        .unwrap();
        assert!(req.note.is_none());
    }

    #[test]
    fn test_stats_and_audit_are_flat_objects() {
        let stats = StatsResponse {
            counts: CounterStats {
                waiting: 3,
                ..Default::default()
            },
            uptime_seconds: 42,
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["waiting"], 3);
        assert_eq!(value["uptime_seconds"], 42);

        let audit = AuditResponse {
            consistent: false,
            report: AuditReport {
                violations: vec!["server s-1 is SERVING with no ticket".to_string()],
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&audit).unwrap();
        assert_eq!(value["consistent"], false);
        assert_eq!(value["violations"].as_array().unwrap().len(), 1);
    }
}
