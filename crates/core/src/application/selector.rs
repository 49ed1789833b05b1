// Assignment Selector - pure decision over ledger/roster snapshots

use crate::domain::{Server, ServerStatus, Ticket, TicketStatus};

/// Least-loaded server, ties broken by earliest arrival rank
///
/// Ids break any remaining tie so the choice is deterministic.
pub fn pick_server(servers: &[Server]) -> Option<&Server> {
    servers
        .iter()
        .filter(|s| s.status == ServerStatus::Idle)
        .min_by(|a, b| {
            a.daily_served_count
                .cmp(&b.daily_served_count)
                .then(a.arrival_rank.cmp(&b.arrival_rank))
                .then_with(|| a.id.cmp(&b.id))
        })
}

/// Oldest waiting ticket (strict FIFO, first of equal timestamps wins)
pub fn pick_ticket(tickets: &[Ticket]) -> Option<&Ticket> {
    tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Waiting)
        .min_by_key(|t| t.created_at)
}

/// Next (ticket, server) pairing, or `None` when there is nothing to do
pub fn select<'a>(
    waiting: &'a [Ticket],
    idle: &'a [Server],
) -> Option<(&'a Ticket, &'a Server)> {
    let ticket = pick_ticket(waiting)?;
    let server = pick_server(idle)?;
    Some((ticket, server))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle(id: &str, rank: i64, served: i64) -> Server {
        let mut s = Server::new(id, 0, id.to_uppercase());
        s.check_in(rank).unwrap();
        s.daily_served_count = served;
        s
    }

    fn ticket(id: &str, created_at: i64) -> Ticket {
        Ticket::new(id, created_at, "c", "Client", "svc", "Service")
    }

    #[test]
    fn test_equal_load_prefers_earliest_arrival() {
        let servers = vec![idle("s3", 3, 0), idle("s1", 1, 0), idle("s2", 2, 0)];
        assert_eq!(pick_server(&servers).unwrap().id, "s1");
    }

    #[test]
    fn test_lower_load_wins_regardless_of_rank() {
        let servers = vec![idle("early", 1, 4), idle("late", 9, 2), idle("mid", 5, 3)];
        assert_eq!(pick_server(&servers).unwrap().id, "late");
    }

    #[test]
    fn test_non_idle_servers_are_skipped() {
        let mut busy = idle("busy", 1, 0);
        busy.begin_service().unwrap();
        let absent = Server::new("absent", 0, "Absent");
        let servers = vec![busy, absent, idle("free", 7, 10)];
        assert_eq!(pick_server(&servers).unwrap().id, "free");
    }

    #[test]
    fn test_fifo_ticket_order() {
        let tickets = vec![ticket("b", 20), ticket("a", 10), ticket("c", 30)];
        assert_eq!(pick_ticket(&tickets).unwrap().id, "a");
    }

    #[test]
    fn test_equal_timestamps_keep_insertion_order() {
        let tickets = vec![ticket("first", 10), ticket("second", 10)];
        assert_eq!(pick_ticket(&tickets).unwrap().id, "first");
    }

    #[test]
    fn test_empty_sets_select_nothing() {
        let servers = vec![idle("s1", 1, 0)];
        let tickets = vec![ticket("a", 1)];
        assert!(select(&[], &servers).is_none());
        assert!(select(&tickets, &[]).is_none());
    }

    #[test]
    fn test_select_pairs_oldest_with_least_loaded() {
        let servers = vec![idle("s1", 1, 1), idle("s2", 2, 0)];
        let tickets = vec![ticket("b", 2), ticket("a", 1)];
        let (t, s) = select(&tickets, &servers).unwrap();
        assert_eq!((t.id.as_str(), s.id.as_str()), ("a", "s2"));
    }
}
