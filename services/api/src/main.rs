use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod routes;
mod state;
mod upload;

#[cfg(test)]
mod test_support;

use common::{
    config::AppConfig,
    database::{health_check, init_pool},
    schema::ensure_schema,
};
use ingest::StagingSweeper;
use tokio::net::TcpListener;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting carstock API service");

    let config = AppConfig::from_env()?;

    // Initialize database connection pool
    let pool = init_pool(&config.database).await?;
    if health_check(&pool).await {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }
    ensure_schema(&pool).await?;

    // Reclaim staged files that were never cleaned up
    let _sweeper = StagingSweeper::new(&config.upload)
        .start(&config.upload.sweep_schedule)
        .await?;

    let app = routes::create_router(AppState::new(pool, &config))
        .layer(routes::cors_layer(&config.server));

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("API service listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down carstock API service");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
