// Assignment (distribution result) Domain Model

use crate::domain::server::{Server, ServerId};
use crate::domain::ticket::{Ticket, TicketId};
use serde::{Deserialize, Serialize};

/// A committed ticket -> server pairing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub ticket_id: TicketId,
    pub requester_id: String,
    pub requester_name: String,
    pub server_id: ServerId,
    pub server_name: String,
    pub service_name: String,
    pub started_at: i64,
}

impl Assignment {
    pub fn new(ticket: &Ticket, server: &Server, started_at: i64) -> Self {
        Self {
            ticket_id: ticket.id.clone(),
            requester_id: ticket.requester_id.clone(),
            requester_name: ticket.requester_name.clone(),
            server_id: server.id.clone(),
            server_name: server.name.clone(),
            service_name: ticket.service_name.clone(),
            started_at,
        }
    }
}

/// Result of an automatic distribution attempt
///
/// An empty queue or an empty roster is a valid result, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistributionOutcome {
    Assigned(Assignment),
    NothingToDistribute,
}

impl DistributionOutcome {
    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            DistributionOutcome::Assigned(a) => Some(a),
            DistributionOutcome::NothingToDistribute => None,
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, DistributionOutcome::NothingToDistribute)
    }
}
