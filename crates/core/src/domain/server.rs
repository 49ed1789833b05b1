// Server (professional) Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Server ID (UUID v4)
pub type ServerId = String;

/// Server availability status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerStatus {
    Absent,
    Idle,
    Serving,
}

impl ServerStatus {
    pub const ALL: [ServerStatus; 3] = [
        ServerStatus::Absent,
        ServerStatus::Idle,
        ServerStatus::Serving,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServerStatus::Absent => "ABSENT",
            ServerStatus::Idle => "IDLE",
            ServerStatus::Serving => "SERVING",
        }
    }
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ABSENT" => Ok(ServerStatus::Absent),
            "IDLE" => Ok(ServerStatus::Idle),
            "SERVING" => Ok(ServerStatus::Serving),
            other => Err(DomainError::ValidationError(format!(
                "Unknown server status: {}",
                other
            ))),
        }
    }
}

/// Server Entity - a staff member who fulfills tickets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub id: ServerId,
    pub name: String,
    pub status: ServerStatus,

    /// Check-in order among present servers; 0 while absent
    pub arrival_rank: i64,

    /// Tickets finished since the last daily reset
    pub daily_served_count: i64,

    pub active: bool,
    pub created_at: i64, // epoch ms
}

impl Server {
    pub fn new(id: impl Into<String>, created_at: i64, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: ServerStatus::Absent,
            arrival_rank: 0,
            daily_served_count: 0,
            active: true,
            created_at,
        }
    }

    pub fn is_present(&self) -> bool {
        self.status != ServerStatus::Absent
    }

    fn not_available(&self) -> DomainError {
        DomainError::ServerNotAvailable {
            server_id: self.id.clone(),
            status: self.status.to_string(),
        }
    }

    /// Absent -> Idle with the given arrival rank
    pub fn check_in(&mut self, rank: i64) -> Result<()> {
        if !self.active {
            return Err(DomainError::ServerInactive(self.id.clone()));
        }
        if self.status != ServerStatus::Absent {
            return Err(DomainError::ValidationError(format!(
                "Server {} is already checked in (status: {})",
                self.id, self.status
            )));
        }
        if rank <= 0 {
            return Err(DomainError::ValidationError(format!(
                "Arrival rank must be positive, got {}",
                rank
            )));
        }
        self.status = ServerStatus::Idle;
        self.arrival_rank = rank;
        Ok(())
    }

    /// Idle -> Absent
    pub fn check_out(&mut self) -> Result<()> {
        if self.status != ServerStatus::Idle {
            return Err(self.not_available());
        }
        self.status = ServerStatus::Absent;
        self.arrival_rank = 0;
        Ok(())
    }

    /// Idle -> Serving
    pub fn begin_service(&mut self) -> Result<()> {
        if self.status != ServerStatus::Idle {
            return Err(self.not_available());
        }
        self.status = ServerStatus::Serving;
        Ok(())
    }

    /// Serving -> Idle; the daily count moves only for completed services
    pub fn end_service(&mut self, completed: bool) -> Result<()> {
        if self.status != ServerStatus::Serving {
            return Err(DomainError::ValidationError(format!(
                "Server {} is not serving (status: {})",
                self.id, self.status
            )));
        }
        self.status = ServerStatus::Idle;
        if completed {
            self.daily_served_count += 1;
        }
        Ok(())
    }

    /// Start-of-day state
    pub fn reset_daily(&mut self) {
        self.status = ServerStatus::Absent;
        self.arrival_rank = 0;
        self.daily_served_count = 0;
    }
}

/// Servers grouped by status for the front-desk board
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerBoard {
    pub serving: Vec<Server>,
    pub idle: Vec<Server>,
    pub absent: Vec<Server>,
}

impl ServerBoard {
    /// Group servers; present groups by arrival rank, absent by name
    pub fn from_servers(servers: Vec<Server>) -> Self {
        let mut board = ServerBoard::default();
        for server in servers {
            match server.status {
                ServerStatus::Serving => board.serving.push(server),
                ServerStatus::Idle => board.idle.push(server),
                ServerStatus::Absent => board.absent.push(server),
            }
        }
        board.serving.sort_by_key(|s| s.arrival_rank);
        board.idle.sort_by_key(|s| s.arrival_rank);
        board.absent.sort_by(|a, b| a.name.cmp(&b.name));
        board
    }

    pub fn len(&self) -> usize {
        self.serving.len() + self.idle.len() + self.absent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_server_is_absent() {
        let server = Server::new("s-1", 0, "Bia");
        assert_eq!(server.status, ServerStatus::Absent);
        assert_eq!(server.arrival_rank, 0);
        assert!(server.active);
    }

    #[test]
    fn test_lifecycle() {
        let mut server = Server::new("s-1", 0, "Bia");
        server.check_in(3).unwrap();
        assert_eq!(server.status, ServerStatus::Idle);
        assert_eq!(server.arrival_rank, 3);

        server.begin_service().unwrap();
        assert_eq!(server.status, ServerStatus::Serving);

        server.end_service(true).unwrap();
        assert_eq!(server.status, ServerStatus::Idle);
        assert_eq!(server.daily_served_count, 1);

        server.begin_service().unwrap();
        server.end_service(false).unwrap();
        assert_eq!(server.daily_served_count, 1);

        server.check_out().unwrap();
        assert_eq!(server.status, ServerStatus::Absent);
        assert_eq!(server.arrival_rank, 0);
    }

    #[test]
    fn test_serving_server_cannot_check_out() {
        let mut server = Server::new("s-1", 0, "Bia");
        server.check_in(1).unwrap();
        server.begin_service().unwrap();
        let err = server.check_out().unwrap_err();
        assert!(matches!(err, DomainError::ServerNotAvailable { .. }));
    }

    #[test]
    fn test_inactive_server_cannot_check_in() {
        let mut server = Server::new("s-1", 0, "Bia");
        server.active = false;
        assert_eq!(
            server.check_in(1).unwrap_err(),
            DomainError::ServerInactive("s-1".to_string())
        );
    }

    #[test]
    fn test_double_check_in_rejected() {
        let mut server = Server::new("s-1", 0, "Bia");
        server.check_in(1).unwrap();
        assert!(server.check_in(2).is_err());
        assert_eq!(server.arrival_rank, 1);
    }

    #[test]
    fn test_reset_daily() {
        let mut server = Server::new("s-1", 0, "Bia");
        server.check_in(2).unwrap();
        server.begin_service().unwrap();
        server.end_service(true).unwrap();
        server.reset_daily();
        assert_eq!(server.status, ServerStatus::Absent);
        assert_eq!(server.arrival_rank, 0);
        assert_eq!(server.daily_served_count, 0);
    }

    #[test]
    fn test_board_grouping() {
        let mut a = Server::new("a", 0, "Zoe");
        let mut b = Server::new("b", 0, "Ana");
        let mut c = Server::new("c", 0, "Caio");
        let d = Server::new("d", 0, "Bruno");
        a.check_in(2).unwrap();
        b.check_in(1).unwrap();
        c.check_in(3).unwrap();
        c.begin_service().unwrap();

        let board = ServerBoard::from_servers(vec![a, b, c, d]);
        let idle: Vec<_> = board.idle.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(idle, vec!["b", "a"]);
        assert_eq!(board.serving.len(), 1);
        assert_eq!(board.absent[0].name, "Bruno");
        assert_eq!(board.len(), 4);
    }
}
