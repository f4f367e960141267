//! In-memory session store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use taskhub_protocols::{Channel, Server, Session, SessionStore, StoreError, TaskResourceState};

use crate::apply;

/// Session store that lives as long as the process.
pub struct MemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            session: RwLock::new(None),
        }
    }

    /// Create a store holding `session`.
    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }

    async fn modify<T>(&self, f: impl FnOnce(&mut Session) -> T) -> T {
        let mut guard = self.session.write().await;
        let session = guard.get_or_insert_with(Session::new);
        let out = f(session);
        session.touch();
        out
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn add_server(&self, server: &Server) -> Result<(), StoreError> {
        self.modify(|s| apply::add_server(s, server)).await;
        Ok(())
    }

    async fn add_channel(&self, server_id: &str, channel: &Channel) -> Result<(), StoreError> {
        self.modify(|s| apply::add_channel(s, server_id, channel)).await
    }

    async fn archive_task_server(&self, task_id: &str) -> Result<(), StoreError> {
        self.modify(|s| apply::archive_task_server(s, task_id)).await;
        Ok(())
    }

    async fn upsert_task_state(&self, state: &TaskResourceState) -> Result<(), StoreError> {
        self.modify(|s| apply::upsert_task_state(s, state)).await;
        Ok(())
    }

    async fn get_current_session(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.session.read().await.clone())
    }

    async fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear_session(&self) -> Result<(), StoreError> {
        *self.session.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
