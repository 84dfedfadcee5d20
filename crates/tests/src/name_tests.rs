use crate::fixtures::fakes::InMemoryReservationLedger;
use chrono::Utc;
use meethub_services::names::{NameError, ParticipantNameService, ReservationLedger};
use std::sync::Arc;

const TTL_MS: i64 = 300_000;

fn service() -> (Arc<InMemoryReservationLedger>, ParticipantNameService) {
    let ledger = Arc::new(InMemoryReservationLedger::default());
    let service = ParticipantNameService::new(ledger.clone(), TTL_MS);
    (ledger, service)
}

#[tokio::test]
async fn first_claimant_gets_the_requested_name() {
    let (_, service) = service();
    let granted = service.reserve("standup", "Alice").await.unwrap();
    assert_eq!(granted, "Alice");
}

#[tokio::test]
async fn duplicate_names_get_numeric_suffixes() {
    let (_, service) = service();
    assert_eq!(service.reserve("standup", "Alice").await.unwrap(), "Alice");
    assert_eq!(
        service.reserve("standup", "Alice").await.unwrap(),
        "Alice_1"
    );
    assert_eq!(
        service.reserve("standup", "Alice").await.unwrap(),
        "Alice_2"
    );
}

#[tokio::test]
async fn name_matching_is_case_insensitive() {
    let (_, service) = service();
    assert_eq!(service.reserve("standup", "Alice").await.unwrap(), "Alice");
    assert_eq!(
        service.reserve("standup", "ALICE").await.unwrap(),
        "ALICE_1"
    );
}

#[tokio::test]
async fn the_same_name_is_free_in_a_different_room() {
    let (_, service) = service();
    assert_eq!(service.reserve("standup", "Alice").await.unwrap(), "Alice");
    assert_eq!(service.reserve("retro", "Alice").await.unwrap(), "Alice");
}

#[tokio::test]
async fn release_frees_the_name_for_the_next_claimant() {
    let (_, service) = service();
    assert_eq!(service.reserve("standup", "Alice").await.unwrap(), "Alice");
    service.release("standup", "Alice").await;
    assert_eq!(service.reserve("standup", "Alice").await.unwrap(), "Alice");
}

#[tokio::test]
async fn expired_reservation_counts_as_free() {
    let (ledger, service) = service();
    let now = Utc::now().timestamp_millis();
    // Reservation that lapsed a minute ago.
    assert!(
        ledger
            .try_reserve("standup", "alice", now - 60_000, now - TTL_MS - 60_000)
            .await
            .unwrap()
    );

    assert_eq!(service.reserve("standup", "Alice").await.unwrap(), "Alice");
}

#[tokio::test]
async fn cleanup_reaps_only_expired_reservations() {
    let (ledger, service) = service();
    let now = Utc::now().timestamp_millis();
    ledger
        .try_reserve("standup", "stale", now - 60_000, now - TTL_MS - 60_000)
        .await
        .unwrap();
    service.reserve("standup", "Fresh").await.unwrap();

    let removed = service.cleanup_expired("standup").await.unwrap();

    assert_eq!(removed, 1);
    assert!(!ledger.is_reserved("standup", "stale"));
    assert!(ledger.is_reserved("standup", "fresh"));
}

#[tokio::test]
async fn blank_names_are_rejected() {
    let (_, service) = service();
    let err = service.reserve("standup", "   ").await.unwrap_err();
    assert!(matches!(err, NameError::EmptyName));
}
