// Integration tests for the registration flow against a real database.
// These tests verify:
// 1. Register/cancel round trips keep the ledger and the counter in step
// 2. Capacity and duplicate rules hold through the HTTP handlers
// 3. The guarded UPDATE keeps concurrent registrations within capacity

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use futures::future::join_all;
use sqlx::PgPool;
use uuid::Uuid;

use skillsphere_api::handlers::registrations::{
    cancel_registration, register_for_event, RegisterRequest,
};
use skillsphere_api::middleware::auth::AuthUser;
use skillsphere_api::models::Role;
use skillsphere_api::services::{
    MlServiceClient, PgEventDirectory, PgRegistrationLedger, RegistrationService,
};
use skillsphere_api::{AppState, Config};

mod test_helpers;
use test_helpers::*;

fn app_state(pool: PgPool) -> AppState {
    let config = Arc::new(Config::from_env().unwrap());
    let ml_client = Arc::new(
        MlServiceClient::new(
            config.ml_service_url.clone(),
            Duration::from_secs(config.ml_timeout_secs),
        )
        .unwrap(),
    );
    AppState::new(Arc::new(pool), config, ml_client)
}

fn auth_user(user_id: Uuid, role: Role) -> AuthUser {
    AuthUser {
        user_id,
        email: format!("{}@example.com", user_id),
        role,
    }
}

#[tokio::test]
#[ignore] // Ignore by default - requires test database
async fn test_register_and_cancel_flow() {
    let pool = setup_test_db().await;
    let organizer_id = create_test_user(&pool, "organizer").await;
    let student_id = create_test_user(&pool, "student").await;
    let event_id = create_test_event(&pool, organizer_id, Some(2), "upcoming").await;

    let app_state = app_state(pool.clone());

    let result = register_for_event(
        axum::extract::State(app_state.clone()),
        axum::Extension(auth_user(student_id, Role::Student)),
        axum::Json(RegisterRequest {
            event_id: event_id.to_string(),
        }),
    )
    .await;

    let (status, axum::Json(entry)) = result.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry.status, "registered");
    assert_eq!(registered_count(&pool, event_id).await, 1);
    assert_eq!(active_ledger_entries(&pool, event_id).await, 1);

    let result = cancel_registration(
        axum::extract::Path(entry.id.clone()),
        axum::extract::State(app_state.clone()),
        axum::Extension(auth_user(student_id, Role::Student)),
    )
    .await;

    let (status, _) = result.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(registered_count(&pool, event_id).await, 0);
    assert_eq!(active_ledger_entries(&pool, event_id).await, 0);

    // A second cancel of the same entry must not release another unit.
    let result = cancel_registration(
        axum::extract::Path(entry.id),
        axum::extract::State(app_state),
        axum::Extension(auth_user(student_id, Role::Student)),
    )
    .await;

    let (status, _) = result.unwrap_err();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(registered_count(&pool, event_id).await, 0);
}

#[tokio::test]
#[ignore]
async fn test_full_event_rejects_registration() {
    let pool = setup_test_db().await;
    let organizer_id = create_test_user(&pool, "organizer").await;
    let first = create_test_user(&pool, "student").await;
    let second = create_test_user(&pool, "student").await;
    let event_id = create_test_event(&pool, organizer_id, Some(1), "upcoming").await;

    let app_state = app_state(pool.clone());

    register_for_event(
        axum::extract::State(app_state.clone()),
        axum::Extension(auth_user(first, Role::Student)),
        axum::Json(RegisterRequest {
            event_id: event_id.to_string(),
        }),
    )
    .await
    .unwrap();

    let result = register_for_event(
        axum::extract::State(app_state),
        axum::Extension(auth_user(second, Role::Student)),
        axum::Json(RegisterRequest {
            event_id: event_id.to_string(),
        }),
    )
    .await;

    let (status, _) = result.unwrap_err();
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(registered_count(&pool, event_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_registration_rejected() {
    let pool = setup_test_db().await;
    let organizer_id = create_test_user(&pool, "organizer").await;
    let student_id = create_test_user(&pool, "student").await;
    let event_id = create_test_event(&pool, organizer_id, None, "upcoming").await;

    let app_state = app_state(pool.clone());

    register_for_event(
        axum::extract::State(app_state.clone()),
        axum::Extension(auth_user(student_id, Role::Student)),
        axum::Json(RegisterRequest {
            event_id: event_id.to_string(),
        }),
    )
    .await
    .unwrap();

    let result = register_for_event(
        axum::extract::State(app_state),
        axum::Extension(auth_user(student_id, Role::Student)),
        axum::Json(RegisterRequest {
            event_id: event_id.to_string(),
        }),
    )
    .await;

    let (status, _) = result.unwrap_err();
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(active_ledger_entries(&pool, event_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn test_register_on_cancelled_event_rejected() {
    let pool = setup_test_db().await;
    let organizer_id = create_test_user(&pool, "organizer").await;
    let student_id = create_test_user(&pool, "student").await;
    let event_id = create_test_event(&pool, organizer_id, None, "cancelled").await;

    let app_state = app_state(pool.clone());

    let result = register_for_event(
        axum::extract::State(app_state),
        axum::Extension(auth_user(student_id, Role::Student)),
        axum::Json(RegisterRequest {
            event_id: event_id.to_string(),
        }),
    )
    .await;

    let (status, _) = result.unwrap_err();
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(active_ledger_entries(&pool, event_id).await, 0);
}

#[tokio::test]
#[ignore]
async fn test_cancel_requires_ownership() {
    let pool = setup_test_db().await;
    let organizer_id = create_test_user(&pool, "organizer").await;
    let owner = create_test_user(&pool, "student").await;
    let stranger = create_test_user(&pool, "student").await;
    let event_id = create_test_event(&pool, organizer_id, Some(5), "upcoming").await;

    let app_state = app_state(pool.clone());

    let (_, axum::Json(entry)) = register_for_event(
        axum::extract::State(app_state.clone()),
        axum::Extension(auth_user(owner, Role::Student)),
        axum::Json(RegisterRequest {
            event_id: event_id.to_string(),
        }),
    )
    .await
    .unwrap();

    let result = cancel_registration(
        axum::extract::Path(entry.id),
        axum::extract::State(app_state),
        axum::Extension(auth_user(stranger, Role::Student)),
    )
    .await;

    let (status, _) = result.unwrap_err();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(registered_count(&pool, event_id).await, 1);
    assert_eq!(active_ledger_entries(&pool, event_id).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn test_concurrent_registrations_respect_capacity() {
    let pool = setup_test_db().await;
    let organizer_id = create_test_user(&pool, "organizer").await;
    let event_id = create_test_event(&pool, organizer_id, Some(3), "upcoming").await;

    let mut user_ids = Vec::new();
    for _ in 0..12 {
        user_ids.push(create_test_user(&pool, "student").await);
    }

    let shared_pool = Arc::new(pool.clone());
    let ledger = Arc::new(PgRegistrationLedger::new(shared_pool.clone()));
    let directory = Arc::new(PgEventDirectory::new(shared_pool));
    let service = Arc::new(RegistrationService::new(ledger, directory));

    let results = join_all(user_ids.into_iter().map(|user_id| {
        let service = service.clone();
        tokio::spawn(async move { service.register(user_id, event_id).await })
    }))
    .await;

    let admitted = results
        .into_iter()
        .filter(|r| r.as_ref().unwrap().is_ok())
        .count();

    assert_eq!(admitted, 3);
    assert_eq!(registered_count(&pool, event_id).await, 3);
    assert_eq!(active_ledger_entries(&pool, event_id).await, 3);
}
