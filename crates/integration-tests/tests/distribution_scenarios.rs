//! Automatic and forced distribution scenarios

mod common;

use common::Counter;
use walkin_core::domain::{DistributionOutcome, DomainError, ServerStatus, TicketStatus};
use walkin_core::error::AppError;

#[tokio::test]
async fn test_oldest_ticket_goes_to_earliest_arrival_then_next() {
    let counter = Counter::in_memory().await;

    let a = counter.enqueue("Ana", "Haircut").await;
    let b = counter.enqueue("Bia", "Manicure").await;
    let s1 = counter.staff("S1").await;
    let s2 = counter.staff("S2").await;

    let first = counter.coordinator.distribute_automatic().await.unwrap();
    let first = first.assignment().unwrap();
    assert_eq!((first.ticket_id.as_str(), first.server_id.as_str()), (a.as_str(), s1.as_str()));
    assert_eq!(first.service_name, "Haircut");

    let second = counter.coordinator.distribute_automatic().await.unwrap();
    let second = second.assignment().unwrap();
    assert_eq!((second.ticket_id.as_str(), second.server_id.as_str()), (b.as_str(), s2.as_str()));

    let third = counter.coordinator.distribute_automatic().await.unwrap();
    assert_eq!(third, DistributionOutcome::NothingToDistribute);

    counter.assert_consistent().await;
}

#[tokio::test]
async fn test_nothing_to_distribute_leaves_state_untouched() {
    let counter = Counter::in_memory().await;

    // No servers present
    let a = counter.enqueue("Ana", "Haircut").await;
    let outcome = counter.coordinator.distribute_automatic().await.unwrap();
    assert!(outcome.is_nothing());
    assert_eq!(
        counter.intake.find_ticket(&a).await.unwrap().status,
        TicketStatus::Waiting
    );

    // Servers present, queue served
    let s1 = counter.staff("S1").await;
    counter.coordinator.distribute_automatic().await.unwrap();
    counter.coordinator.complete_ticket(&a, None, None).await.unwrap();
    let before = counter.server(&s1).await;

    let outcome = counter.coordinator.distribute_automatic().await.unwrap();
    assert!(outcome.is_nothing());
    assert_eq!(counter.server(&s1).await, before);
}

#[tokio::test]
async fn test_least_served_server_wins_over_earlier_arrival() {
    let counter = Counter::in_memory().await;
    let s1 = counter.staff("S1").await;
    let s2 = counter.staff("S2").await;

    // S1 serves one client, then both are idle with counts 1 and 0
    let warmup = counter.enqueue("Ana", "Haircut").await;
    counter
        .coordinator
        .distribute_forced(&warmup, &s1)
        .await
        .unwrap();
    counter
        .coordinator
        .complete_ticket(&warmup, Some(3_500), None)
        .await
        .unwrap();

    counter.enqueue("Bia", "Manicure").await;
    let outcome = counter.coordinator.distribute_automatic().await.unwrap();
    assert_eq!(outcome.assignment().unwrap().server_id, s2);
}

#[tokio::test]
async fn test_forced_assignment_to_serving_server_is_refused() {
    let counter = Counter::in_memory().await;
    let a = counter.enqueue("Ana", "Haircut").await;
    let b = counter.enqueue("Bia", "Manicure").await;
    let s2 = counter.staff("S2").await;

    counter.coordinator.distribute_forced(&b, &s2).await.unwrap();
    let ticket_before = counter.intake.find_ticket(&a).await.unwrap();
    let server_before = counter.server(&s2).await;
    assert_eq!(server_before.status, ServerStatus::Serving);

    let err = counter
        .coordinator
        .distribute_forced(&a, &s2)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::ServerNotAvailable { ref server_id, .. }) if *server_id == s2
    ));

    assert_eq!(counter.intake.find_ticket(&a).await.unwrap(), ticket_before);
    assert_eq!(counter.server(&s2).await, server_before);
    counter.assert_consistent().await;
}

#[tokio::test]
async fn test_forced_assignment_bypasses_selector_order() {
    let counter = Counter::in_memory().await;
    counter.enqueue("Ana", "Haircut").await;
    let late = counter.enqueue("Bia", "Manicure").await;
    counter.staff("S1").await;
    let s2 = counter.staff("S2").await;

    let assignment = counter
        .coordinator
        .distribute_forced(&late, &s2)
        .await
        .unwrap();
    assert_eq!(assignment.ticket_id, late);
    assert_eq!(assignment.server_id, s2);
    assert_eq!(assignment.requester_name, "Bia");
}

#[tokio::test]
async fn test_forced_assignment_of_non_waiting_ticket_is_refused() {
    let counter = Counter::in_memory().await;
    let a = counter.enqueue("Ana", "Haircut").await;
    let s1 = counter.staff("S1").await;
    let s2 = counter.staff("S2").await;
    counter.coordinator.distribute_forced(&a, &s1).await.unwrap();

    let err = counter
        .coordinator
        .distribute_forced(&a, &s2)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::TicketNotWaiting { .. })
    ));
    assert_eq!(counter.server(&s2).await.status, ServerStatus::Idle);
}

#[tokio::test]
async fn test_forced_assignment_with_unknown_ids() {
    let counter = Counter::in_memory().await;
    let a = counter.enqueue("Ana", "Haircut").await;
    let s1 = counter.staff("S1").await;

    let err = counter
        .coordinator
        .distribute_forced("t-404", &s1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = counter
        .coordinator
        .distribute_forced(&a, "s-404")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_waiting_list_is_fifo() {
    let counter = Counter::in_memory().await;
    let ids = vec![
        counter.enqueue("Ana", "Haircut").await,
        counter.enqueue("Bia", "Manicure").await,
        counter.enqueue("Caio", "Beard").await,
    ];

    let waiting = counter.intake.list_waiting().await.unwrap();
    let listed: Vec<_> = waiting.iter().map(|t| t.id.clone()).collect();
    assert_eq!(listed, ids);
    assert!(waiting.windows(2).all(|w| w[0].created_at <= w[1].created_at));
}

#[tokio::test]
async fn test_same_timestamp_keeps_enqueue_order() {
    let counter = Counter::frozen().await;
    let ids = vec![
        counter.enqueue("Ana", "Haircut").await,
        counter.enqueue("Bia", "Manicure").await,
        counter.enqueue("Caio", "Beard").await,
    ];

    let waiting = counter.intake.list_waiting().await.unwrap();
    assert!(waiting.iter().all(|t| t.created_at == common::OPENING_MILLIS));
    let listed: Vec<_> = waiting.iter().map(|t| t.id.clone()).collect();
    assert_eq!(listed, ids);

    counter.staff("S1").await;
    let outcome = counter.coordinator.distribute_automatic().await.unwrap();
    assert_eq!(outcome.assignment().unwrap().ticket_id, ids[0]);
}
