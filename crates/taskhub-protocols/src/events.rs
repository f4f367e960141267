//! Lifecycle events broadcast by the orchestrator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HandlerError;
use crate::types::{
    AgentChannelConfig, Channel, Server, TaskProgressUpdate, TaskResourceState, TaskStatus,
};

/// Discriminant of [`ServerEvent`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerEventKind {
    TaskServerCreated,
    AgentChannelAdded,
    TaskProgressUpdated,
    TaskServerArchived,
}

/// A task server lifecycle event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    TaskServerCreated {
        server: Server,
        state: TaskResourceState,
    },
    AgentChannelAdded {
        server_id: String,
        channel: Channel,
        agent: AgentChannelConfig,
    },
    TaskProgressUpdated {
        update: TaskProgressUpdate,
    },
    TaskServerArchived {
        task_id: String,
        server_id: String,
        status: TaskStatus,
    },
}

impl ServerEvent {
    pub fn kind(&self) -> ServerEventKind {
        match self {
            Self::TaskServerCreated { .. } => ServerEventKind::TaskServerCreated,
            Self::AgentChannelAdded { .. } => ServerEventKind::AgentChannelAdded,
            Self::TaskProgressUpdated { .. } => ServerEventKind::TaskProgressUpdated,
            Self::TaskServerArchived { .. } => ServerEventKind::TaskServerArchived,
        }
    }

    /// Task the event concerns, when it names one directly.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Self::TaskServerCreated { state, .. } => Some(&state.task_id),
            Self::AgentChannelAdded { .. } => None,
            Self::TaskProgressUpdated { update } => Some(&update.task_id),
            Self::TaskServerArchived { task_id, .. } => Some(task_id),
        }
    }
}

/// Subscriber for orchestrator events.
///
/// A returned error (or a panic) is logged by the publisher and does not
/// affect delivery to other handlers.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handler name used in logs.
    fn name(&self) -> &str {
        "anonymous"
    }

    async fn handle(&self, event: &ServerEvent) -> Result<(), HandlerError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProgressStatus;

    #[test]
    fn test_event_kind_and_task_id() {
        let event = ServerEvent::TaskProgressUpdated {
            update: TaskProgressUpdate::new("t1", ProgressStatus::Started),
        };
        assert_eq!(event.kind(), ServerEventKind::TaskProgressUpdated);
        assert_eq!(event.task_id(), Some("t1"));

        let archived = ServerEvent::TaskServerArchived {
            task_id: "t2".to_string(),
            server_id: "s2".to_string(),
            status: TaskStatus::Completed,
        };
        assert_eq!(archived.kind(), ServerEventKind::TaskServerArchived);
        assert_eq!(archived.task_id(), Some("t2"));
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = ServerEvent::TaskServerArchived {
            task_id: "t1".to_string(),
            server_id: "s1".to_string(),
            status: TaskStatus::Failed,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "task_server_archived");
        assert_eq!(json["status"], "failed");
    }
}
