//! Durable server and channel records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerKind {
    /// Generated for a task.
    Task,
    Regular,
}

/// Kind of channel within a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Agent,
    Progress,
    Planning,
    General,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Progress => "progress",
            Self::Planning => "planning",
            Self::General => "general",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sub-surface within a server.
///
/// Channels are never removed; they only accumulate activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub kind: ChannelKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_role: Option<String>,

    #[serde(default)]
    pub message_count: u64,

    pub last_activity: DateTime<Utc>,
}

impl Channel {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            agent_role: None,
            message_count: 0,
            last_activity: Utc::now(),
        }
    }

    pub fn with_agent_role(mut self, role: impl Into<String>) -> Self {
        self.agent_role = Some(role.into());
        self
    }

    /// Record one message posted to this channel.
    pub fn touch(&mut self) {
        self.message_count += 1;
        self.last_activity = Utc::now();
    }
}

/// Top-level container for one task's activity surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub kind: ServerKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    #[serde(default)]
    pub channels: Vec<Channel>,

    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,

    #[serde(default)]
    pub archived: bool,
}

impl Server {
    /// Create a task server owning the given channels.
    pub fn for_task(
        id: impl Into<String>,
        name: impl Into<String>,
        task_id: impl Into<String>,
        channels: Vec<Channel>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            kind: ServerKind::Task,
            task_id: Some(task_id.into()),
            channels,
            created_at: now,
            last_activity: now,
            archived: false,
        }
    }

    pub fn channel(&self, channel_id: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == channel_id)
    }

    pub fn channels_of_kind(&self, kind: ChannelKind) -> impl Iterator<Item = &Channel> {
        self.channels.iter().filter(move |c| c.kind == kind)
    }

    pub fn is_task_server(&self) -> bool {
        self.kind == ServerKind::Task
    }
}
