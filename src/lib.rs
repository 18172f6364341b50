// Library root - exports for testing

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::ApiError;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use database::DatabasePool;
use services::{MlServiceClient, PgEventDirectory, PgRegistrationLedger, RegistrationService};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabasePool,
    pub config: Arc<Config>,
    pub registrations: Arc<RegistrationService>,
    pub ml_client: Arc<MlServiceClient>,
}

impl AppState {
    /// Wire the registration core against its Postgres collaborators.
    pub fn new(
        db_pool: DatabasePool,
        config: Arc<Config>,
        ml_client: Arc<MlServiceClient>,
    ) -> Self {
        let ledger = Arc::new(PgRegistrationLedger::new(db_pool.clone()));
        let directory = Arc::new(PgEventDirectory::new(db_pool.clone()));
        let registrations = Arc::new(RegistrationService::new(ledger, directory));
        Self {
            db_pool,
            config,
            registrations,
            ml_client,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/events", get(handlers::list_events))
        .route("/api/events", post(handlers::create_event))
        .route("/api/events/:id", get(handlers::get_event))
        .route("/api/events/:id", put(handlers::update_event))
        .route("/api/events/:id", delete(handlers::delete_event))
        .route("/api/registrations", post(handlers::register_for_event))
        .route("/api/registrations/my", get(handlers::my_registrations))
        .route("/api/registrations/:id", delete(handlers::cancel_registration))
        .route("/api/ml/extract-skills", post(handlers::extract_skills))
        .route("/api/ml/recommend-events", post(handlers::recommend_events))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ))
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
