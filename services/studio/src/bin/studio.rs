//! services/studio/src/bin/studio.rs

use echoverse_core::telemetry::log_directive;
use std::sync::Arc;
use studio_lib::{
    config::StudioConfig,
    error::StudioError,
    web::{router, state::AppState},
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), StudioError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(StudioConfig::from_env()?);
    let filter = EnvFilter::try_new(log_directive(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(
        "Configuration loaded. Directory scope: {:?}, generate delay: {:?}, session idle timeout: {:?}",
        config.directory_scope, config.generate_delay, config.session_idle_timeout
    );

    // --- 2. Create the Web Router ---
    let app_state = Arc::new(AppState::new(config.clone()));
    let app = router(app_state);

    // --- 3. Start the Server ---
    info!("Starting studio on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
