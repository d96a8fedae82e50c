//! Knight Rehber Service - HTTP API for the Knight Rehber app and admin panel
//!
//! This is the main entry point for the rehber service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rehber_service::{create_router, open_store, AppState, ConfiguredCredentials, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rehber=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Knight Rehber Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env()?;

    tracing::info!(
        listen_addr = %config.listen_addr,
        store_backend = ?config.store_backend,
        data_dir = %config.data_dir,
        admin_configured = %config.admin.is_some(),
        app_version = %config.app_version,
        "Service configuration loaded"
    );

    let store = open_store(&config)?;

    // An unreachable store fails requests, not startup
    if let Err(e) = rehber_store::bootstrap(store.as_ref()).await {
        tracing::error!(error = %e, "Store bootstrap failed, continuing without seed data");
    }

    let credentials = Arc::new(ConfiguredCredentials::new(config.admin.clone()));
    let state = AppState::new(store, config.clone(), credentials)?;

    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
