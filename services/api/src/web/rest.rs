//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the backend's REST endpoints, the router and
//! CORS policy that wrap them, and the master definition for the OpenAPI
//! specification.

use crate::config::Settings;
use crate::web::state::AppState;
use axum::{extract::State, http::HeaderValue, response::Json, routing::get, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::warn;
use utoipa::{OpenApi, ToSchema};

pub const ROOT_MESSAGE: &str = "Hello from Echoverse Backend!";

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        root_handler,
        health_handler,
    ),
    components(
        schemas(RootResponse, HealthResponse)
    ),
    tags(
        (name = "Echoverse Backend", description = "Backend API for Echoverse.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

/// Greeting plus the effective, non-secret settings.
#[derive(Serialize, ToSchema)]
pub struct RootResponse {
    message: String,
    log_level: String,
    cors_origins: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Service banner.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Greeting with the configured log level and CORS origins", body = RootResponse)
    )
)]
pub async fn root_handler(State(app_state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        message: ROOT_MESSAGE.to_string(),
        log_level: app_state.settings.log_level.clone(),
        cors_origins: app_state.settings.cors_origins.clone(),
    })
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "The service is up", body = HealthResponse)
    )
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

//=========================================================================================
// Router
//=========================================================================================

/// Builds the complete backend application: both endpoints behind the CORS layer.
pub fn router(app_state: Arc<AppState>) -> Router {
    let cors = cors_layer(&app_state.settings);
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(app_state)
}

/// Restricts to the configured origins, or accepts any origin when none are
/// configured or one of them is `*`.
///
/// Credentials are allowed, which rules out the literal `*` wildcard, so "any"
/// origin, method and header is expressed by mirroring the request.
pub fn cors_layer(settings: &Settings) -> CorsLayer {
    let origin = if settings.allows_any_origin() {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = settings
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Ignoring CORS origin '{}': {}", origin, e);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
