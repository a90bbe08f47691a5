//! services/api/src/bin/api.rs

use api_lib::{
    config::load_settings,
    error::ApiError,
    web::{router, state::AppState},
};
use echoverse_core::telemetry::log_directive;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let settings = Arc::new(load_settings()?);
    let filter = EnvFilter::try_new(log_directive(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    if settings.allows_any_origin() {
        info!("CORS: accepting any origin");
    } else {
        info!("CORS: restricted to {:?}", settings.cors_origins);
    }
    if settings.watsonx_project_id.is_none() && settings.watsonx_space_id.is_none() {
        info!("Neither WATSONX_PROJECT_ID nor WATSONX_SPACE_ID is set");
    }
    if !settings.object_storage_configured() {
        info!("Object storage is not configured");
    }

    // --- 2. Create the Web Router ---
    let app_state = Arc::new(AppState::new(settings.clone()));
    let app = router(app_state);

    // --- 3. Start the Server ---
    info!("Starting server on {}", settings.bind_address);
    let listener = tokio::net::TcpListener::bind(&settings.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
