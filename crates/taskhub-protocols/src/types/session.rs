//! Persisted session snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Server, TaskResourceState, TaskStatus};

/// One message recorded in the session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub id: String,
    pub server_id: String,
    pub channel_id: String,
    pub author: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Everything the session store persists across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,

    #[serde(default)]
    pub servers: Vec<Server>,

    #[serde(default)]
    pub task_states: Vec<TaskResourceState>,

    #[serde(default)]
    pub message_history: Vec<HistoryMessage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_server_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_channel_id: Option<String>,

    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session with a fresh id.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            servers: Vec::new(),
            task_states: Vec::new(),
            message_history: Vec::new(),
            active_server_id: None,
            active_channel_id: None,
            updated_at: Utc::now(),
        }
    }

    pub fn server(&self, server_id: &str) -> Option<&Server> {
        self.servers.iter().find(|s| s.id == server_id)
    }

    pub fn server_mut(&mut self, server_id: &str) -> Option<&mut Server> {
        self.servers.iter_mut().find(|s| s.id == server_id)
    }

    /// Latest server owned by `task_id`.
    pub fn server_for_task(&self, task_id: &str) -> Option<&Server> {
        self.servers
            .iter()
            .filter(|s| s.task_id.as_deref() == Some(task_id))
            .max_by_key(|s| s.created_at)
    }

    /// Insert or replace a server by id.
    pub fn upsert_server(&mut self, server: Server) {
        match self.server_mut(&server.id) {
            Some(existing) => *existing = server,
            None => self.servers.push(server),
        }
    }

    /// Insert or replace a task state by task id.
    pub fn upsert_task_state(&mut self, state: TaskResourceState) {
        match self.task_states.iter_mut().find(|s| s.task_id == state.task_id) {
            Some(existing) => *existing = state,
            None => self.task_states.push(state),
        }
    }

    /// Whether the server with `server_id` is flagged archived.
    pub fn is_server_archived(&self, server_id: &str) -> bool {
        self.server(server_id).is_some_and(|s| s.archived)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Sanitized counts, safe to export.
    pub fn summary(&self) -> SessionSummary {
        let count_status = |status: TaskStatus| {
            self.task_states.iter().filter(|s| s.status == status).count()
        };
        SessionSummary {
            session_id: self.id.clone(),
            timestamp: self.updated_at,
            server_count: self.servers.len(),
            archived_server_count: self.servers.iter().filter(|s| s.archived).count(),
            channel_count: self.servers.iter().map(|s| s.channels.len()).sum(),
            active_task_count: count_status(TaskStatus::Active),
            completed_task_count: count_status(TaskStatus::Completed),
            failed_task_count: count_status(TaskStatus::Failed),
            message_count: self.message_history.len(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts describing a session without any message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub server_count: usize,
    pub archived_server_count: usize,
    pub channel_count: usize,
    pub active_task_count: usize,
    pub completed_task_count: usize,
    pub failed_task_count: usize,
    pub message_count: usize,
}
