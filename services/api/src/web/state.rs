//! services/api/src/web/state.rs
//!
//! Defines the backend's shared state.

use crate::config::Settings;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
///
/// Only read after startup, so it is shared without any locking.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }
}
