//! Declarative topology templates.

use serde::{Deserialize, Serialize};

use super::ChannelKind;

/// Task type entry that matches any task type.
pub const WILDCARD_TASK_TYPE: &str = "*";

/// Who may see a server or channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Open,
    Restricted,
}

/// Permission descriptor carried through templates unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDescriptor {
    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub read_only: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_roles: Vec<String>,
}

impl PermissionDescriptor {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn restricted_to(roles: &[&str]) -> Self {
        Self {
            visibility: Visibility::Restricted,
            read_only: false,
            allowed_roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Recipe for one channel (or one channel per agent for `agent` kind).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelTemplate {
    pub kind: ChannelKind,

    /// Name pattern with `{agentRole}`/`{agentName}` or `{taskType}`/`{phase}` tokens.
    pub name_pattern: String,

    /// Restricts agent channels to these roles when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_roles: Option<Vec<String>>,

    #[serde(default = "default_auto_create")]
    pub auto_create: bool,

    #[serde(default)]
    pub permissions: PermissionDescriptor,
}

fn default_auto_create() -> bool {
    true
}

impl ChannelTemplate {
    pub fn new(kind: ChannelKind, name_pattern: impl Into<String>) -> Self {
        Self {
            kind,
            name_pattern: name_pattern.into(),
            agent_roles: None,
            auto_create: true,
            permissions: PermissionDescriptor::default(),
        }
    }

    pub fn restricted_to_roles(mut self, roles: &[&str]) -> Self {
        self.agent_roles = Some(roles.iter().map(|r| r.to_string()).collect());
        self
    }

    pub fn manual(mut self) -> Self {
        self.auto_create = false;
        self
    }

    pub fn with_permissions(mut self, permissions: PermissionDescriptor) -> Self {
        self.permissions = permissions;
        self
    }

    /// Whether an agent with `role` gets a channel from this template.
    pub fn admits_role(&self, role: &str) -> bool {
        match &self.agent_roles {
            None => true,
            Some(roles) => roles.iter().any(|r| r == role),
        }
    }
}

/// Recipe describing which channels a server initially contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyTemplate {
    pub id: String,
    pub name: String,

    /// Task types this template applies to; may contain [`WILDCARD_TASK_TYPE`].
    #[serde(default)]
    pub task_types: Vec<String>,

    /// Server name pattern with `{taskTitle}`, `{taskType}`, `{phase}`, `{priority}`.
    pub name_pattern: String,

    #[serde(default)]
    pub channels: Vec<ChannelTemplate>,

    #[serde(default)]
    pub permissions: PermissionDescriptor,
}

impl TopologyTemplate {
    /// Literal task type match; the wildcard is not expanded here.
    pub fn applies_to(&self, task_type: &str) -> bool {
        self.task_types.iter().any(|t| t == task_type)
    }

    pub fn is_wildcard(&self) -> bool {
        self.task_types.iter().any(|t| t == WILDCARD_TASK_TYPE)
    }
}
