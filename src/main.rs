use std::sync::Arc;

use api_rest::{AppState, router};
use mw_core::{CoreConfig, Database};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the hospital middleware
///
/// Resolves configuration, prepares the database schema and serves the REST API
/// (with Swagger UI at `/swagger-ui`).
///
/// # Environment Variables
/// - `SERVER_ADDR`: listen address (default: "0.0.0.0:8080")
/// - `DATABASE_URL`: sqlx SQLite URL (default: "sqlite://middleware.db")
/// - `JWT_SECRET`, `JWT_TTL_HOURS`: token signing secret and lifetime
/// - `HIS_API_BASE_URL`, `HIS_API_TIMEOUT_SECS`, `HIS_API_ENABLED`: external patient directory
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - configuration values are invalid,
/// - the database cannot be opened or migrated,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("middleware_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("mw_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());

    let cfg = Arc::new(CoreConfig::from_env()?);
    let db = Database::connect(cfg.database_url()).await?;
    db.migrate().await?;

    if !cfg.his_api_enabled() {
        tracing::info!("HIS remote lookups disabled; serving fixture data only");
    }

    let app = router(AppState::new(cfg.clone(), &db)?);

    tracing::info!("++ Starting hospital middleware REST on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Hospital middleware stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
