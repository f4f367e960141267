//! Full-session persistence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use taskhub_protocols::{
    Channel, Server, Session, SessionStore, StoreError, TaskResourceState, ViewTracker,
};

/// Store decorator that runs every write under one lock.
///
/// Whole-session saves read, modify and overwrite the session; holding the
/// same lock as the incremental writes keeps them from dropping a server or
/// state written in between.
pub struct SerializedStore {
    inner: Arc<dyn SessionStore>,
    lock: Mutex<()>,
}

impl SerializedStore {
    pub fn new(inner: Arc<dyn SessionStore>) -> Self {
        Self {
            inner,
            lock: Mutex::new(()),
        }
    }

    pub fn inner(&self) -> &Arc<dyn SessionStore> {
        &self.inner
    }

    /// Load the session (or start one), apply `f` and save it back.
    pub async fn save_with<F>(&self, f: F) -> Result<Session, StoreError>
    where
        F: FnOnce(&mut Session) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut session = self.inner.get_current_session().await?.unwrap_or_default();
        f(&mut session);
        session.touch();
        self.inner.save_session(&session).await?;
        Ok(session)
    }
}

#[async_trait]
impl SessionStore for SerializedStore {
    async fn add_server(&self, server: &Server) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.inner.add_server(server).await
    }

    async fn add_channel(&self, server_id: &str, channel: &Channel) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.inner.add_channel(server_id, channel).await
    }

    async fn archive_task_server(&self, task_id: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.inner.archive_task_server(task_id).await
    }

    async fn upsert_task_state(&self, state: &TaskResourceState) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.inner.upsert_task_state(state).await
    }

    async fn get_current_session(&self) -> Result<Option<Session>, StoreError> {
        self.inner.get_current_session().await
    }

    async fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.inner.save_session(session).await
    }

    async fn clear_session(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.inner.clear_session().await
    }
}

/// Saves the whole session with the tracker's current selection.
pub struct SessionPersister {
    store: Arc<SerializedStore>,
    tracker: Arc<dyn ViewTracker>,
    saves: AtomicU64,
}

impl SessionPersister {
    pub fn new(store: Arc<SerializedStore>, tracker: Arc<dyn ViewTracker>) -> Self {
        Self {
            store,
            tracker,
            saves: AtomicU64::new(0),
        }
    }

    pub async fn persist(&self) -> Result<(), StoreError> {
        let (server_id, channel_id) = self.tracker.active_selection();
        let session = self
            .store
            .save_with(move |session| {
                session.active_server_id = server_id;
                session.active_channel_id = channel_id;
            })
            .await?;
        let n = self.saves.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Session {} saved (save #{})", session.id, n);
        Ok(())
    }

    /// Successful saves since construction.
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;
