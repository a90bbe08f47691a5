//! services/studio/src/web/state.rs
//!
//! Defines the studio's shared state and how it is wired together.

use crate::adapters::{Argon2Credentials, ToneSynthesizer};
use crate::config::StudioConfig;
use echoverse_core::{
    flow::SessionFlow,
    memory::InMemorySessionStore,
    ports::SessionStore,
};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<StudioConfig>,
    pub flow: Arc<SessionFlow>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    /// Wires the Argon2 hasher, the placeholder synthesizer and in-memory
    /// sessions that expire after the configured idle time.
    pub fn new(config: Arc<StudioConfig>) -> Self {
        let sessions = Arc::new(InMemorySessionStore::with_idle_timeout(
            config.session_idle_timeout,
        ));
        Self::with_sessions(config, sessions)
    }

    pub fn with_sessions(config: Arc<StudioConfig>, sessions: Arc<dyn SessionStore>) -> Self {
        let flow = SessionFlow::new(
            config.directory_scope,
            Arc::new(Argon2Credentials),
            Arc::new(ToneSynthesizer::new(config.generate_delay)),
        );
        Self {
            config,
            flow: Arc::new(flow),
            sessions,
        }
    }
}
