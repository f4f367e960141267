//! Task initiation and progress report types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task priority, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

/// Expected agent for a task; one agent channel per entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentChannelConfig {
    /// Agent role, e.g. `developer`.
    pub role: String,

    /// Display name of the agent.
    pub name: String,

    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Channel template override for this agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_template: Option<String>,
}

impl AgentChannelConfig {
    pub fn new(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            name: name.into(),
            capabilities: Vec::new(),
            channel_template: None,
        }
    }

    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }
}

/// Request to create a task server.
///
/// Built once per task initiation and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskServerConfig {
    pub task_id: String,
    pub task_title: String,
    pub task_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default)]
    pub expected_agents: Vec<AgentChannelConfig>,

    #[serde(default)]
    pub include_progress_channel: bool,

    #[serde(default)]
    pub include_planning_channel: bool,

    #[serde(default)]
    pub auto_archive_on_completion: bool,

    /// Explicit template id; takes precedence over task type matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

impl TaskServerConfig {
    pub fn new(
        task_id: impl Into<String>,
        task_title: impl Into<String>,
        task_type: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            task_title: task_title.into(),
            task_type: task_type.into(),
            phase: None,
            priority: TaskPriority::default(),
            expected_agents: Vec::new(),
            include_progress_channel: false,
            include_planning_channel: false,
            auto_archive_on_completion: false,
            template_id: None,
        }
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_agent(mut self, agent: AgentChannelConfig) -> Self {
        self.expected_agents.push(agent);
        self
    }

    pub fn with_progress_channel(mut self, include: bool) -> Self {
        self.include_progress_channel = include;
        self
    }

    pub fn with_planning_channel(mut self, include: bool) -> Self {
        self.include_planning_channel = include;
        self
    }

    pub fn with_auto_archive(mut self, auto_archive: bool) -> Self {
        self.auto_archive_on_completion = auto_archive;
        self
    }

    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }
}

/// Status carried by a progress report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Started,
    InProgress,
    Blocked,
    Completed,
    Failed,
}

impl ProgressStatus {
    /// Whether this report ends the task lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::str::FromStr for ProgressStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "started" => Ok(Self::Started),
            "in_progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown progress status: {}", other)),
        }
    }
}

/// Progress report for a running task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskProgressUpdate {
    pub task_id: String,
    pub status: ProgressStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<String>,

    /// Completion percentage, 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl TaskProgressUpdate {
    pub fn new(task_id: impl Into<String>, status: ProgressStatus) -> Self {
        Self {
            task_id: task_id.into(),
            status,
            current_phase: None,
            progress: None,
            message: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.current_phase = Some(phase.into());
        self
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress.min(100));
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
