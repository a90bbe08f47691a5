pub mod cookie;
pub mod pages;
pub mod render;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use pages::{
    generate_handler, index_handler, login_handler, logout_handler, navigate_handler,
    signup_handler, speech_handler, upload_handler,
};
use state::AppState;

/// Uploaded documents are read into memory whole.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Creates the main Axum router for the studio.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler))
        .route("/navigate", post(navigate_handler))
        .route("/logout", post(logout_handler))
        .route("/upload", post(upload_handler))
        .route("/generate", post(generate_handler))
        .route("/speech.wav", get(speech_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(app_state)
}
