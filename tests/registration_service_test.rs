// Registration core against in-memory collaborators.
// These tests verify:
// 1. The happy path and the typed business-rule failures
// 2. Capacity is never exceeded under concurrent registrations
// 3. At most one active entry per (user, event), even under races
// 4. Cancellation releases capacity exactly once

use std::sync::Arc;

use futures::future::join_all;
use uuid::Uuid;

use skillsphere_api::error::ApiError;
use skillsphere_api::models::{EventStatus, RegistrationStatus};
use skillsphere_api::services::{RegistrationLedger, RegistrationService};

use fakes::{InMemoryDirectory, InMemoryLedger};

fn service_with_event(
    status: EventStatus,
    max_participants: Option<i32>,
) -> (
    Arc<RegistrationService>,
    Arc<InMemoryLedger>,
    Arc<InMemoryDirectory>,
    Uuid,
) {
    let event_id = Uuid::new_v4();
    let ledger = Arc::new(InMemoryLedger::default());
    let directory = Arc::new(InMemoryDirectory::with_event(
        event_id,
        status,
        max_participants,
    ));
    let service = Arc::new(RegistrationService::new(ledger.clone(), directory.clone()));
    (service, ledger, directory, event_id)
}

#[tokio::test]
async fn register_creates_active_entry() {
    let (service, ledger, directory, event_id) =
        service_with_event(EventStatus::Upcoming, Some(10));
    let user_id = Uuid::new_v4();

    let entry = service.register(user_id, event_id).await.unwrap();

    assert_eq!(entry.user_id, user_id);
    assert_eq!(entry.event_id, event_id);
    assert_eq!(entry.status, RegistrationStatus::Registered);
    assert_eq!(ledger.active_entries(event_id), 1);
    assert_eq!(directory.active_count(event_id), 1);
}

#[tokio::test]
async fn register_unknown_event_fails() {
    let ledger = Arc::new(InMemoryLedger::default());
    let directory = Arc::new(InMemoryDirectory::default());
    let service = RegistrationService::new(ledger.clone(), directory);

    let result = service.register(Uuid::new_v4(), Uuid::new_v4()).await;

    assert!(matches!(result, Err(ApiError::EventNotFound)));
    assert_eq!(ledger.total_entries(), 0);
}

#[tokio::test]
async fn register_on_cancelled_event_is_rejected() {
    let (service, ledger, _directory, event_id) =
        service_with_event(EventStatus::Cancelled, None);

    let result = service.register(Uuid::new_v4(), event_id).await;

    assert!(matches!(result, Err(ApiError::EventNotOpen)));
    assert_eq!(ledger.total_entries(), 0);
}

#[tokio::test]
async fn register_on_completed_event_is_rejected() {
    let (service, ledger, _directory, event_id) =
        service_with_event(EventStatus::Completed, None);

    let result = service.register(Uuid::new_v4(), event_id).await;

    assert!(matches!(result, Err(ApiError::EventNotOpen)));
    assert_eq!(ledger.total_entries(), 0);
}

#[tokio::test]
async fn register_on_ongoing_event_is_a_late_join() {
    let (service, _ledger, directory, event_id) =
        service_with_event(EventStatus::Ongoing, Some(5));

    service.register(Uuid::new_v4(), event_id).await.unwrap();

    assert_eq!(directory.active_count(event_id), 1);
}

#[tokio::test]
async fn second_registration_by_same_user_is_rejected() {
    let (service, ledger, directory, event_id) =
        service_with_event(EventStatus::Upcoming, None);
    let user_id = Uuid::new_v4();

    service.register(user_id, event_id).await.unwrap();
    let result = service.register(user_id, event_id).await;

    assert!(matches!(result, Err(ApiError::AlreadyRegistered)));
    assert_eq!(ledger.active_entries(event_id), 1);
    assert_eq!(directory.active_count(event_id), 1);
}

#[tokio::test]
async fn full_event_rejects_further_registrations() {
    let (service, _ledger, directory, event_id) =
        service_with_event(EventStatus::Upcoming, Some(1));

    service.register(Uuid::new_v4(), event_id).await.unwrap();
    let result = service.register(Uuid::new_v4(), event_id).await;

    assert!(matches!(result, Err(ApiError::EventFull)));
    assert_eq!(directory.active_count(event_id), 1);
}

#[tokio::test]
async fn unbounded_event_admits_everyone() {
    let (service, ledger, _directory, event_id) =
        service_with_event(EventStatus::Upcoming, None);

    for _ in 0..20 {
        service.register(Uuid::new_v4(), event_id).await.unwrap();
    }

    assert_eq!(ledger.active_entries(event_id), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_registrations_never_exceed_capacity() {
    let (service, ledger, directory, event_id) =
        service_with_event(EventStatus::Upcoming, Some(5));

    let attempts = 25;
    let results = join_all((0..attempts).map(|_| {
        let service = service.clone();
        tokio::spawn(async move { service.register(Uuid::new_v4(), event_id).await })
    }))
    .await;

    let mut admitted = 0;
    let mut full = 0;
    for result in results {
        match result.unwrap() {
            Ok(_) => admitted += 1,
            Err(ApiError::EventFull) => full += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(admitted, 5);
    assert_eq!(full, attempts - 5);
    assert_eq!(ledger.active_entries(event_id), 5);
    assert_eq!(directory.active_count(event_id), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_duplicates_yield_one_active_entry() {
    let (service, ledger, directory, event_id) =
        service_with_event(EventStatus::Upcoming, None);
    let user_id = Uuid::new_v4();

    let results = join_all((0..8).map(|_| {
        let service = service.clone();
        tokio::spawn(async move { service.register(user_id, event_id).await })
    }))
    .await;

    let mut admitted = 0;
    let mut duplicates = 0;
    for result in results {
        match result.unwrap() {
            Ok(_) => admitted += 1,
            Err(ApiError::AlreadyRegistered) => duplicates += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(admitted, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(ledger.active_entries(event_id), 1);
    // Every lost duplicate race must have compensated its reservation.
    assert_eq!(directory.active_count(event_id), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn capacity_one_race_admits_exactly_one() {
    let (service, ledger, directory, event_id) =
        service_with_event(EventStatus::Upcoming, Some(1));
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();

    let a = {
        let service = service.clone();
        tokio::spawn(async move { service.register(user_a, event_id).await })
    };
    let b = {
        let service = service.clone();
        tokio::spawn(async move { service.register(user_b, event_id).await })
    };

    let (a, b) = (a.await.unwrap(), b.await.unwrap());

    assert!(a.is_ok() != b.is_ok(), "exactly one registration must win");
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(ApiError::EventFull)));
    assert_eq!(ledger.active_entries(event_id), 1);
    assert_eq!(directory.active_count(event_id), 1);
}

#[tokio::test]
async fn cancel_releases_capacity_for_the_next_caller() {
    let (service, _ledger, directory, event_id) =
        service_with_event(EventStatus::Upcoming, Some(1));
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();

    let entry = service.register(user_a, event_id).await.unwrap();
    assert!(matches!(
        service.register(user_b, event_id).await,
        Err(ApiError::EventFull)
    ));

    let cancelled = service.cancel(entry.id, user_a).await.unwrap();
    assert_eq!(cancelled.status, RegistrationStatus::Cancelled);
    assert_eq!(directory.active_count(event_id), 0);

    service.register(user_b, event_id).await.unwrap();
    assert_eq!(directory.active_count(event_id), 1);
}

#[tokio::test]
async fn cancel_then_reregister_keeps_net_accounting() {
    let (service, ledger, directory, event_id) =
        service_with_event(EventStatus::Upcoming, Some(3));
    let user_id = Uuid::new_v4();

    let first = service.register(user_id, event_id).await.unwrap();
    service.cancel(first.id, user_id).await.unwrap();
    let second = service.register(user_id, event_id).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(ledger.active_entries(event_id), 1);
    assert_eq!(ledger.total_entries(), 2);
    assert_eq!(directory.active_count(event_id), 1);
}

#[tokio::test]
async fn double_cancel_never_releases_twice() {
    let (service, _ledger, directory, event_id) =
        service_with_event(EventStatus::Upcoming, Some(1));
    let user_id = Uuid::new_v4();

    let entry = service.register(user_id, event_id).await.unwrap();
    service.cancel(entry.id, user_id).await.unwrap();
    assert_eq!(directory.active_count(event_id), 0);

    let result = service.cancel(entry.id, user_id).await;
    assert!(matches!(result, Err(ApiError::NotFound)));
    assert_eq!(directory.active_count(event_id), 0);
}

#[tokio::test]
async fn cancel_of_foreign_entry_is_forbidden() {
    let (service, ledger, directory, event_id) =
        service_with_event(EventStatus::Upcoming, Some(2));
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let entry = service.register(owner, event_id).await.unwrap();
    let result = service.cancel(entry.id, stranger).await;

    assert!(matches!(result, Err(ApiError::Forbidden)));
    assert_eq!(ledger.active_entries(event_id), 1);
    assert_eq!(directory.active_count(event_id), 1);
}

#[tokio::test]
async fn cancel_unknown_entry_is_not_found() {
    let (service, _ledger, _directory, _event_id) =
        service_with_event(EventStatus::Upcoming, None);

    let result = service.cancel(Uuid::new_v4(), Uuid::new_v4()).await;

    assert!(matches!(result, Err(ApiError::NotFound)));
}

#[tokio::test]
async fn list_mine_is_most_recent_first() {
    let user_id = Uuid::new_v4();
    let event_a = Uuid::new_v4();
    let event_b = Uuid::new_v4();

    let ledger = Arc::new(InMemoryLedger::default());
    let directory = Arc::new(InMemoryDirectory::default());
    let service = RegistrationService::new(ledger.clone(), directory);

    ledger.append(user_id, event_a).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    ledger.append(user_id, event_b).await.unwrap();

    let mine = service.list_mine(user_id).await.unwrap();

    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].event_id, event_b);
    assert_eq!(mine[1].event_id, event_a);
}
