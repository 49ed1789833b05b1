// Ticket Domain Model

use crate::domain::error::{DomainError, Result};
use crate::domain::server::ServerId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Ticket ID (UUID v4)
pub type TicketId = String;

/// Charged amount in minor currency units (cents)
pub type Charge = i64;

/// Ticket lifecycle status
///
/// Legal edges: `Waiting -> InService -> Finished`, `Waiting -> Cancelled`,
/// `InService -> Cancelled`. `Finished` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Waiting,
    InService,
    Finished,
    Cancelled,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Waiting,
        TicketStatus::InService,
        TicketStatus::Finished,
        TicketStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Waiting => "WAITING",
            TicketStatus::InService => "IN_SERVICE",
            TicketStatus::Finished => "FINISHED",
            TicketStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Finished | TicketStatus::Cancelled)
    }

    /// The single transition table for tickets
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (TicketStatus::Waiting, TicketStatus::InService)
                | (TicketStatus::InService, TicketStatus::Finished)
                | (TicketStatus::Waiting, TicketStatus::Cancelled)
                | (TicketStatus::InService, TicketStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "WAITING" => Ok(TicketStatus::Waiting),
            "IN_SERVICE" => Ok(TicketStatus::InService),
            "FINISHED" => Ok(TicketStatus::Finished),
            "CANCELLED" => Ok(TicketStatus::Cancelled),
            other => Err(DomainError::ValidationError(format!(
                "Unknown ticket status: {}",
                other
            ))),
        }
    }
}

/// Ticket Entity - one client's service request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,

    // External references, with display names snapshotted at intake
    pub requester_id: String,
    pub requester_name: String,
    pub service_id: String,
    pub service_name: String,

    pub server_id: Option<ServerId>,
    pub status: TicketStatus,

    pub created_at: i64, // epoch ms
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub cancelled_at: Option<i64>,

    pub charge: Option<Charge>,
    pub note: Option<String>,
    pub cancel_reason: Option<String>,
}

impl Ticket {
    /// Create a new waiting ticket
    ///
    /// # Arguments
    ///
    /// * `id` - Unique ticket ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        requester_id: impl Into<String>,
        requester_name: impl Into<String>,
        service_id: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            requester_id: requester_id.into(),
            requester_name: requester_name.into(),
            service_id: service_id.into(),
            service_name: service_name.into(),
            server_id: None,
            status: TicketStatus::Waiting,
            created_at,
            started_at: None,
            finished_at: None,
            cancelled_at: None,
            charge: None,
            note: None,
            cancel_reason: None,
        }
    }

    fn ensure_transition(&self, to: TicketStatus) -> Result<()> {
        if self.status.can_transition_to(to) {
            Ok(())
        } else {
            Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            })
        }
    }

    /// Transition to InService with the given server
    pub fn start(&mut self, server_id: impl Into<String>, now_millis: i64) -> Result<()> {
        self.ensure_transition(TicketStatus::InService)?;
        self.status = TicketStatus::InService;
        self.server_id = Some(server_id.into());
        self.started_at = Some(now_millis);
        Ok(())
    }

    /// Transition to Finished, recording the optional charge and note
    pub fn finish(
        &mut self,
        now_millis: i64,
        charge: Option<Charge>,
        note: Option<String>,
    ) -> Result<()> {
        self.ensure_transition(TicketStatus::Finished)?;
        self.status = TicketStatus::Finished;
        self.finished_at = Some(now_millis);
        self.charge = charge;
        if note.is_some() {
            self.note = note;
        }
        Ok(())
    }

    /// Transition to Cancelled
    ///
    /// Returns the server that must be released when the ticket was in service.
    pub fn cancel(&mut self, now_millis: i64, reason: Option<String>) -> Result<Option<ServerId>> {
        if self.status == TicketStatus::Finished {
            return Err(DomainError::AlreadyFinished(self.id.clone()));
        }
        self.ensure_transition(TicketStatus::Cancelled)?;

        let released = if self.status == TicketStatus::InService {
            self.finished_at = Some(now_millis);
            self.server_id.clone()
        } else {
            None
        };

        self.status = TicketStatus::Cancelled;
        self.cancelled_at = Some(now_millis);
        self.cancel_reason = reason;
        Ok(released)
    }

    /// Check the field invariants that must hold for the current status
    pub fn invariant_violation(&self) -> Option<String> {
        let started = self.started_at.is_some();
        let assigned = self.server_id.is_some();
        let ended = self.finished_at.is_some();

        let (want_assigned, want_ended) = match self.status {
            TicketStatus::Waiting => (false, false),
            TicketStatus::InService => (true, false),
            TicketStatus::Finished => (true, true),
            // Cancelled tickets carry service fields only when cancelled after starting
            TicketStatus::Cancelled => (started, started),
        };

        if assigned != want_assigned {
            return Some(format!(
                "ticket {} in {} has server_id = {:?}",
                self.id, self.status, self.server_id
            ));
        }
        if started != want_assigned {
            return Some(format!(
                "ticket {} in {} has started_at = {:?}",
                self.id, self.status, self.started_at
            ));
        }
        if ended != want_ended {
            return Some(format!(
                "ticket {} in {} has finished_at = {:?}",
                self.id, self.status, self.finished_at
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waiting() -> Ticket {
        Ticket::new("t-1", 1_000, "c-1", "Ana", "svc-cut", "Haircut")
    }

    #[test]
    fn test_new_ticket_is_waiting() {
        let ticket = waiting();
        assert_eq!(ticket.status, TicketStatus::Waiting);
        assert!(ticket.server_id.is_none());
        assert!(ticket.invariant_violation().is_none());
    }

    #[test]
    fn test_start_then_finish() {
        let mut ticket = waiting();
        ticket.start("s-1", 2_000).unwrap();
        assert_eq!(ticket.status, TicketStatus::InService);
        assert_eq!(ticket.server_id.as_deref(), Some("s-1"));
        assert!(ticket.invariant_violation().is_none());

        ticket
            .finish(3_000, Some(4500), Some("short layers".to_string()))
            .unwrap();
        assert_eq!(ticket.status, TicketStatus::Finished);
        assert_eq!(ticket.finished_at, Some(3_000));
        assert_eq!(ticket.charge, Some(4500));
        assert!(ticket.invariant_violation().is_none());
    }

    #[test]
    fn test_finish_requires_in_service() {
        let mut ticket = waiting();
        let err = ticket.finish(2_000, None, None).unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition { .. }));
    }

    #[test]
    fn test_cancel_waiting_releases_nobody() {
        let mut ticket = waiting();
        let released = ticket.cancel(2_000, Some("left".to_string())).unwrap();
        assert!(released.is_none());
        assert_eq!(ticket.status, TicketStatus::Cancelled);
        assert!(ticket.finished_at.is_none());
        assert!(ticket.invariant_violation().is_none());
    }

    #[test]
    fn test_cancel_in_service_releases_server() {
        let mut ticket = waiting();
        ticket.start("s-9", 2_000).unwrap();
        let released = ticket.cancel(3_000, None).unwrap();
        assert_eq!(released.as_deref(), Some("s-9"));
        assert_eq!(ticket.finished_at, Some(3_000));
        assert!(ticket.invariant_violation().is_none());
    }

    #[test]
    fn test_finished_ticket_cannot_be_cancelled() {
        let mut ticket = waiting();
        ticket.start("s-1", 2_000).unwrap();
        ticket.finish(3_000, None, None).unwrap();
        let err = ticket.cancel(4_000, None).unwrap_err();
        assert_eq!(err, DomainError::AlreadyFinished("t-1".to_string()));
    }

    #[test]
    fn test_cancelled_ticket_cannot_reopen() {
        let mut ticket = waiting();
        ticket.cancel(2_000, None).unwrap();
        assert!(ticket.start("s-1", 3_000).is_err());
        assert!(ticket.cancel(3_000, None).is_err());
    }

    #[test]
    fn test_transition_table() {
        use TicketStatus::*;
        for from in TicketStatus::ALL {
            for to in TicketStatus::ALL {
                let legal = matches!(
                    (from, to),
                    (Waiting, InService)
                        | (InService, Finished)
                        | (Waiting, Cancelled)
                        | (InService, Cancelled)
                );
                assert_eq!(from.can_transition_to(to), legal, "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in TicketStatus::ALL {
            assert_eq!(status.as_str().parse::<TicketStatus>().unwrap(), status);
        }
        assert!("DONE".parse::<TicketStatus>().is_err());
    }
}
