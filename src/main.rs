// SPDX-License-Identifier: MIT

//! Glimpse API server.

use glimpse::{config::Config, db::Db, services::TokenService, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Glimpse API");

    // Open the database and create the schema if needed
    let db = Db::connect(&config.database_url)
        .await
        .expect("Failed to open database");

    let tokens = TokenService::new(&config.token_secret);

    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        tokens,
    });

    // Build router (verifies the endpoint registry, fail fast)
    let app = glimpse::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("glimpse=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
