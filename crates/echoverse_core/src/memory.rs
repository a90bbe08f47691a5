//! crates/echoverse_core/src/memory.rs
//!
//! In-memory implementations of the storage ports. Nothing survives a restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::User;
use crate::flow::SessionContext;
use crate::ports::{PortError, PortResult, SessionStore, UserDirectory};

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, User>>,
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn insert_user(&self, user: User) -> PortResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(PortError::Conflict(format!("User {}", user.username)));
        }
        users.insert(user.username.clone(), user);
        Ok(())
    }

    async fn get_user(&self, username: &str) -> PortResult<User> {
        self.users
            .read()
            .await
            .get(username)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", username)))
    }

    async fn clear(&self) -> PortResult<()> {
        self.users.write().await.clear();
        Ok(())
    }
}

/// Session contexts keyed by id.
///
/// With an idle timeout, a session that has not been saved for that long is
/// treated as gone and is swept out on the next save.
#[derive(Default)]
pub struct InMemorySessionStore {
    idle_timeout: Option<Duration>,
    sessions: RwLock<HashMap<Uuid, StoredSession>>,
}

struct StoredSession {
    context: SessionContext,
    last_saved: Instant,
}

impl InMemorySessionStore {
    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            idle_timeout: Some(idle_timeout),
            sessions: RwLock::default(),
        }
    }

    /// Number of stored sessions, expired ones included until the next sweep.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn is_live(&self, stored: &StoredSession, now: Instant) -> bool {
        self.idle_timeout
            .map_or(true, |timeout| now.duration_since(stored.last_saved) < timeout)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load_session(&self, session_id: Uuid) -> PortResult<SessionContext> {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .get(&session_id)
            .filter(|stored| self.is_live(stored, now))
            .map(|stored| stored.context.clone())
            .ok_or_else(|| PortError::NotFound(format!("Session {} not found", session_id)))
    }

    async fn save_session(&self, context: SessionContext) -> PortResult<()> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, stored| self.is_live(stored, now));
        let swept = before - sessions.len();
        if swept > 0 {
            debug!("Expired {} idle sessions", swept);
        }

        sessions.insert(
            context.session.id,
            StoredSession {
                context,
                last_saved: now,
            },
        );
        Ok(())
    }

    async fn delete_session(&self, session_id: Uuid) -> PortResult<()> {
        self.sessions.write().await.remove(&session_id);
        Ok(())
    }
}
