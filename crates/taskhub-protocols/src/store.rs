//! Session store protocol definitions.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{Channel, Server, Session, TaskResourceState};

/// Durable persistence of servers, channels and task state.
///
/// Implementations create an empty session on first write when none exists.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Add a server, replacing any server with the same id.
    async fn add_server(&self, server: &Server) -> Result<(), StoreError>;

    /// Append a channel to an existing server.
    async fn add_channel(&self, server_id: &str, channel: &Channel) -> Result<(), StoreError>;

    /// Flag every server owned by `task_id` as archived.
    async fn archive_task_server(&self, task_id: &str) -> Result<(), StoreError>;

    /// Insert or replace the lifecycle record of a task.
    async fn upsert_task_state(&self, state: &TaskResourceState) -> Result<(), StoreError>;

    /// Current session, if one was ever saved.
    async fn get_current_session(&self) -> Result<Option<Session>, StoreError>;

    /// Overwrite the whole session.
    async fn save_session(&self, session: &Session) -> Result<(), StoreError>;

    /// Drop the session entirely.
    async fn clear_session(&self) -> Result<(), StoreError>;
}
