//! JSON file session store.
//!
//! The session lives in a single file:
//! ```text
//! {storage_path}/
//! └── session.json
//! ```
//! Writes go to `session.json.tmp` first and are renamed into place, so a
//! crash mid-write leaves the previous session intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use taskhub_protocols::{Channel, Server, Session, SessionStore, StoreError, TaskResourceState};

use crate::apply;

pub const SESSION_FILE_NAME: &str = "session.json";

/// File-backed session store.
pub struct FileSessionStore {
    storage_path: PathBuf,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Open a store rooted at `storage_path`, creating the directory.
    pub async fn new(storage_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let storage_path = storage_path.into();
        fs::create_dir_all(&storage_path).await?;
        debug!("FileSessionStore initialized at {:?}", storage_path);
        Ok(Self {
            storage_path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    pub fn session_path(&self) -> PathBuf {
        self.storage_path.join(SESSION_FILE_NAME)
    }

    fn temp_path(&self) -> PathBuf {
        self.storage_path.join(format!("{}.tmp", SESSION_FILE_NAME))
    }

    async fn read(&self) -> Result<Option<Session>, StoreError> {
        let path = self.session_path();
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!("Failed to deserialize session from {:?}: {}", path, e);
                Err(e.into())
            }
        }
    }

    async fn write(&self, session: &Session) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(session)?;
        let temp = self.temp_path();
        fs::write(&temp, content).await?;
        fs::rename(&temp, self.session_path()).await?;
        debug!("Saved session {} ({} servers)", session.id, session.servers.len());
        Ok(())
    }

    async fn modify<T>(
        &self,
        f: impl FnOnce(&mut Session) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut session = self.read().await?.unwrap_or_default();
        let out = f(&mut session)?;
        session.touch();
        self.write(&session).await?;
        Ok(out)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn add_server(&self, server: &Server) -> Result<(), StoreError> {
        self.modify(|s| {
            apply::add_server(s, server);
            Ok(())
        })
        .await
    }

    async fn add_channel(&self, server_id: &str, channel: &Channel) -> Result<(), StoreError> {
        self.modify(|s| apply::add_channel(s, server_id, channel)).await
    }

    async fn archive_task_server(&self, task_id: &str) -> Result<(), StoreError> {
        self.modify(|s| {
            apply::archive_task_server(s, task_id);
            Ok(())
        })
        .await
    }

    async fn upsert_task_state(&self, state: &TaskResourceState) -> Result<(), StoreError> {
        self.modify(|s| {
            apply::upsert_task_state(s, state);
            Ok(())
        })
        .await
    }

    async fn get_current_session(&self) -> Result<Option<Session>, StoreError> {
        self.read().await
    }

    async fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.write(session).await
    }

    async fn clear_session(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(self.session_path()).await {
            Ok(()) => {
                debug!("Cleared session at {:?}", self.storage_path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
