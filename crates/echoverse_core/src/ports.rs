//! crates/echoverse_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! The session flow only ever talks to these traits, so the in-memory stores and
//! the placeholder synthesizer can be swapped for real backends.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::User;
use crate::flow::SessionContext;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Stores a new user. Fails with `PortError::Conflict` if the username is taken.
    async fn insert_user(&self, user: User) -> PortResult<()>;

    /// Looks a user up by exact username.
    async fn get_user(&self, username: &str) -> PortResult<User>;

    /// Forgets every registered user.
    async fn clear(&self) -> PortResult<()>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_session(&self, session_id: Uuid) -> PortResult<SessionContext>;

    async fn save_session(&self, context: SessionContext) -> PortResult<()>;

    async fn delete_session(&self, session_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait TextToSpeechService: Send + Sync {
    /// Generates WAV audio data from a string of text.
    async fn generate_audio(&self, text: &str) -> PortResult<Vec<u8>>;
}

/// Turns passwords into stored credentials and checks them again later.
pub trait CredentialHasher: Send + Sync {
    fn hash_password(&self, password: &str) -> PortResult<String>;

    /// `Ok(false)` means a well-formed credential that does not match.
    fn verify_password(&self, password: &str, stored: &str) -> PortResult<bool>;
}
