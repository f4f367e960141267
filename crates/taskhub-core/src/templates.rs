//! Topology template registry.
//!
//! Templates are kept in registration order: when several templates list the
//! same task type, the one registered first wins.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use taskhub_protocols::{
    ChannelKind, ChannelTemplate, PermissionDescriptor, TopologyTemplate, WILDCARD_TASK_TYPE,
};

use crate::error::RegistryError;

/// Id of the fallback template. Always present.
pub const DEFAULT_TEMPLATE_ID: &str = "default";
pub const PHASE_TEMPLATE_ID: &str = "phase";
pub const RESEARCH_TEMPLATE_ID: &str = "research";

/// Roles that get a channel from the phase template's agent channel.
pub const PHASE_AGENT_ROLES: [&str; 4] = ["architect", "developer", "tester", "reviewer"];

/// Registry of topology templates.
pub struct TemplateRegistry {
    templates: RwLock<Vec<Arc<TopologyTemplate>>>,
}

impl TemplateRegistry {
    /// Create a registry seeded with the built-in templates.
    pub fn new() -> Self {
        Self {
            templates: RwLock::new(builtin_templates().into_iter().map(Arc::new).collect()),
        }
    }

    /// Create a registry with the built-ins followed by `extra`.
    pub fn with_templates(extra: Vec<TopologyTemplate>) -> Result<Self, RegistryError> {
        let registry = Self::new();
        for template in extra {
            registry.register(template)?;
        }
        Ok(registry)
    }

    /// Register a template.
    ///
    /// Returns an error if a template with the same id is already registered.
    pub fn register(&self, template: TopologyTemplate) -> Result<(), RegistryError> {
        let mut templates = self.templates.write();
        if templates.iter().any(|t| t.id == template.id) {
            return Err(RegistryError::AlreadyRegistered(template.id));
        }
        debug!("Registered topology template '{}'", template.id);
        templates.push(Arc::new(template));
        Ok(())
    }

    /// Remove a template by id. The default template cannot be removed.
    pub fn unregister(&self, id: &str) -> Result<(), RegistryError> {
        if id == DEFAULT_TEMPLATE_ID {
            return Err(RegistryError::Protected(id.to_string()));
        }
        let mut templates = self.templates.write();
        let before = templates.len();
        templates.retain(|t| t.id != id);
        if templates.len() == before {
            return Err(RegistryError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<TopologyTemplate>> {
        self.templates.read().iter().find(|t| t.id == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn list_ids(&self) -> Vec<String> {
        self.templates.read().iter().map(|t| t.id.clone()).collect()
    }

    pub fn list(&self) -> Vec<Arc<TopologyTemplate>> {
        self.templates.read().clone()
    }

    pub fn len(&self) -> usize {
        self.templates.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.read().is_empty()
    }

    /// Resolve the template for a task.
    ///
    /// An explicit id that is registered wins; otherwise the first template
    /// listing `task_type` literally; otherwise the default template.
    pub fn resolve(&self, task_type: &str, explicit_id: Option<&str>) -> Arc<TopologyTemplate> {
        let templates = self.templates.read();

        if let Some(id) = explicit_id {
            if let Some(template) = templates.iter().find(|t| t.id == id) {
                return template.clone();
            }
            debug!("Explicit template '{}' not registered, matching by task type", id);
        }

        if let Some(template) = templates.iter().find(|t| t.applies_to(task_type)) {
            return template.clone();
        }

        templates
            .iter()
            .find(|t| t.id == DEFAULT_TEMPLATE_ID)
            .cloned()
            .unwrap_or_else(|| Arc::new(default_template()))
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn default_template() -> TopologyTemplate {
    TopologyTemplate {
        id: DEFAULT_TEMPLATE_ID.to_string(),
        name: "Default Task".to_string(),
        task_types: vec![WILDCARD_TASK_TYPE.to_string()],
        name_pattern: "{taskTitle}".to_string(),
        channels: vec![ChannelTemplate::new(ChannelKind::General, "general")],
        permissions: PermissionDescriptor::open(),
    }
}

fn phase_template() -> TopologyTemplate {
    TopologyTemplate {
        id: PHASE_TEMPLATE_ID.to_string(),
        name: "Development Phase".to_string(),
        task_types: (1..=5).map(|n| format!("phase{}", n)).collect(),
        name_pattern: "Phase {phase}: {taskTitle}".to_string(),
        channels: vec![
            ChannelTemplate::new(ChannelKind::Planning, "{taskType}-planning"),
            ChannelTemplate::new(ChannelKind::Progress, "{taskType}-progress"),
            ChannelTemplate::new(ChannelKind::Agent, "{agentRole}-{agentName}")
                .restricted_to_roles(&PHASE_AGENT_ROLES)
                .manual()
                .with_permissions(PermissionDescriptor::restricted_to(&PHASE_AGENT_ROLES)),
        ],
        permissions: PermissionDescriptor::restricted_to(&PHASE_AGENT_ROLES),
    }
}

fn research_template() -> TopologyTemplate {
    TopologyTemplate {
        id: RESEARCH_TEMPLATE_ID.to_string(),
        name: "Research".to_string(),
        task_types: vec!["research".to_string(), "analysis".to_string()],
        name_pattern: "Research: {taskTitle}".to_string(),
        channels: vec![
            ChannelTemplate::new(ChannelKind::General, "research-discussion"),
            ChannelTemplate::new(ChannelKind::Agent, "{agentName}").manual(),
        ],
        permissions: PermissionDescriptor::open(),
    }
}

/// Templates every registry starts with, in resolution order.
pub fn builtin_templates() -> Vec<TopologyTemplate> {
    vec![default_template(), phase_template(), research_template()]
}

#[cfg(test)]
#[path = "templates_tests.rs"]
mod tests;
