use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

use skillsphere_api::services::{seed_data, MlServiceClient};
use skillsphere_api::{build_router, database, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skillsphere_api=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting SkillSphere API server...");

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    info!("Configuration loaded");

    // Initialize database pool
    let db_pool = database::new_pool(&config.database_url).await?;
    info!("Database connection pool created");

    sqlx::migrate!("./migrations").run(&*db_pool).await?;
    info!("Migrations applied");

    // Bootstrap a default organizer if the database is empty
    seed_data::seed_default_organizer(&db_pool).await?;

    // Client for the external skill-extraction/recommendation service
    let ml_client = Arc::new(MlServiceClient::new(
        config.ml_service_url.clone(),
        Duration::from_secs(config.ml_timeout_secs),
    )?);

    // Build application state and routes
    let app_state = AppState::new(db_pool.clone(), config.clone(), ml_client);
    let app = build_router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    // Graceful shutdown
    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutting down gracefully...");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
