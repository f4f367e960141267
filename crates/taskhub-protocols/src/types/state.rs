//! Lifecycle tracking record for task-derived servers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a task server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Active,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// The orchestrator's record of one task's server.
///
/// Independent of the durable [`Server`](super::Server) record; links to it by
/// `server_id` and to its channels by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResourceState {
    pub task_id: String,
    pub server_id: String,
    pub task_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    #[serde(default)]
    pub agent_channel_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_channel_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning_channel_id: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    /// Copied from the task config; consulted by the archive policy.
    #[serde(default)]
    pub auto_archive_on_completion: bool,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskResourceState {
    pub fn is_active(&self) -> bool {
        self.status == TaskStatus::Active
    }

    /// Move to a terminal status and stamp the completion time.
    pub fn finish(&mut self, status: TaskStatus) {
        self.status = status;
        self.completed_at = Some(Utc::now());
    }
}
