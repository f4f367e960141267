//! Task server orchestrator.
//!
//! Owns the index of active task servers. Every mutation is persisted through
//! the [`SessionStore`] and announced on the [`EventBus`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use taskhub_config::{ArchivePolicy, OrchestratorConfig};
use taskhub_protocols::{
    AgentChannelConfig, Channel, ChannelKind, EventHandler, OrchestratorError, ProgressStatus,
    Server, ServerEvent, ServerEventKind, SessionStore, TaskProgressUpdate, TaskResourceState,
    TaskServerConfig, TaskStatus, TopologyTemplate,
};

use crate::error::RegistryError;
use crate::events::{EventBus, SubscriptionId};
use crate::templates::TemplateRegistry;
use crate::topology::{
    agent_channel, format_server_name, generate_topology_with, ChannelIdGenerator, TopologyOptions,
};

/// Name pattern for channels added through [`TaskServerOrchestrator::add_agent_channel`].
const ADDED_AGENT_CHANNEL_PATTERN: &str = "{agentRole}-{agentName}";

/// Creates, tracks and archives task-derived servers.
pub struct TaskServerOrchestrator {
    store: Arc<dyn SessionStore>,
    templates: TemplateRegistry,
    active: RwLock<HashMap<String, TaskResourceState>>,
    events: Arc<EventBus>,
    config: OrchestratorConfig,
}

impl TaskServerOrchestrator {
    /// Create an orchestrator with the built-in templates.
    pub fn new(store: Arc<dyn SessionStore>, config: OrchestratorConfig) -> Self {
        Self::with_registry(store, TemplateRegistry::new(), config)
    }

    /// Create an orchestrator with extra templates registered after the built-ins.
    pub fn with_templates(
        store: Arc<dyn SessionStore>,
        templates: Vec<TopologyTemplate>,
        config: OrchestratorConfig,
    ) -> Result<Self, RegistryError> {
        Ok(Self::with_registry(store, TemplateRegistry::with_templates(templates)?, config))
    }

    fn with_registry(
        store: Arc<dyn SessionStore>,
        templates: TemplateRegistry,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            templates,
            active: RwLock::new(HashMap::new()),
            events: Arc::new(EventBus::new()),
            config,
        }
    }

    /// Create a task server from `config` and start tracking it.
    pub async fn create_task_server(
        &self,
        config: &TaskServerConfig,
    ) -> Result<Server, OrchestratorError> {
        let template = self
            .templates
            .resolve(&config.task_type, config.template_id.as_deref());
        let name = format_server_name(&template, config);
        let options = TopologyOptions {
            deduplicate: self.config.deduplicate_channels,
        };
        let channels = generate_topology_with(&template, config, options);

        let server_id = format!("task-{}-{}", config.task_id, Utc::now().timestamp_millis());
        let server = Server::for_task(server_id, name, config.task_id.clone(), channels);

        if let Err(e) = self.store.add_server(&server).await {
            error!("Failed to persist server for task {}: {}", config.task_id, e);
            return Err(e.into());
        }

        let state = TaskResourceState {
            task_id: config.task_id.clone(),
            server_id: server.id.clone(),
            task_type: config.task_type.clone(),
            phase: config.phase.clone(),
            agent_channel_ids: ids_of_kind(&server, ChannelKind::Agent),
            progress_channel_id: first_of_kind(&server, ChannelKind::Progress),
            planning_channel_id: first_of_kind(&server, ChannelKind::Planning),
            status: TaskStatus::Active,
            auto_archive_on_completion: config.auto_archive_on_completion,
            created_at: server.created_at,
            completed_at: None,
        };

        // The server is already stored; track it even if its state is not.
        if let Err(e) = self.store.upsert_task_state(&state).await {
            warn!("Failed to persist state for task {}: {}", config.task_id, e);
        }

        if let Some(previous) = self.active.write().insert(state.task_id.clone(), state.clone()) {
            warn!(
                "Task {} already had server {}; now tracking {}",
                previous.task_id, previous.server_id, server.id
            );
        }

        info!(
            "Created task server '{}' ({}) with template '{}' and {} channels",
            server.name,
            server.id,
            template.id,
            server.channels.len()
        );

        self.events
            .publish(&ServerEvent::TaskServerCreated {
                server: server.clone(),
                state,
            })
            .await;

        Ok(server)
    }

    /// Add an agent channel to the server of `task_id`.
    pub async fn add_agent_channel(
        &self,
        task_id: &str,
        agent: &AgentChannelConfig,
    ) -> Result<Channel, OrchestratorError> {
        let (state, channel_id) = {
            let mut active = self.active.write();
            let state = active
                .get_mut(task_id)
                .ok_or_else(|| OrchestratorError::NotFound(task_id.to_string()))?;

            let mut ids = ChannelIdGenerator::new(task_id);
            ids.reserve(state.agent_channel_ids.iter().cloned());
            let channel_id = ids.next(&agent.role);
            state.agent_channel_ids.push(channel_id.clone());
            (state.clone(), channel_id)
        };

        let channel = agent_channel(channel_id, ADDED_AGENT_CHANNEL_PATTERN, agent);

        if let Err(e) = self.store.add_channel(&state.server_id, &channel).await {
            error!("Failed to persist channel {} for task {}: {}", channel.id, task_id, e);
            if let Some(state) = self.active.write().get_mut(task_id) {
                state.agent_channel_ids.retain(|id| id != &channel.id);
            }
            return Err(e.into());
        }
        if let Err(e) = self.store.upsert_task_state(&state).await {
            warn!("Failed to persist state for task {}: {}", task_id, e);
        }

        debug!("Added agent channel {} to server {}", channel.id, state.server_id);

        self.events
            .publish(&ServerEvent::AgentChannelAdded {
                server_id: state.server_id.clone(),
                channel: channel.clone(),
                agent: agent.clone(),
            })
            .await;

        Ok(channel)
    }

    /// Apply a progress report. Unknown tasks are ignored.
    ///
    /// A terminal report archives the task server when the archive policy
    /// allows it. Store failures are logged, never returned.
    pub async fn update_task_progress(&self, update: &TaskProgressUpdate) {
        let state = {
            let mut active = self.active.write();
            let Some(state) = active.get_mut(&update.task_id) else {
                warn!("Progress update for unknown task: {}", update.task_id);
                return;
            };

            match update.status {
                ProgressStatus::Completed => state.finish(TaskStatus::Completed),
                ProgressStatus::Failed => state.finish(TaskStatus::Failed),
                _ => {}
            }
            if let Some(phase) = &update.current_phase {
                state.phase = Some(phase.clone());
            }
            state.clone()
        };

        debug!(
            "Task {} progress: {:?} {:?}",
            update.task_id, update.status, update.progress
        );

        self.events
            .publish(&ServerEvent::TaskProgressUpdated {
                update: update.clone(),
            })
            .await;

        if let Err(e) = self.store.upsert_task_state(&state).await {
            warn!("Failed to persist state for task {}: {}", state.task_id, e);
        }

        if !state.status.is_terminal() || !self.should_archive(&state) {
            return;
        }

        let server_known = match self.store.get_current_session().await {
            Ok(session) => {
                session.is_some_and(|s| s.server_for_task(&state.task_id).is_some())
            }
            Err(e) => {
                error!("Failed to look up server for task {}: {}", state.task_id, e);
                return;
            }
        };
        if !server_known {
            warn!(
                "Server {} for task {} not found in session; skipping archive",
                state.server_id, state.task_id
            );
            return;
        }

        if let Err(e) = self.archive_task_server(&state.task_id).await {
            error!("Auto-archive failed for task {}: {}", state.task_id, e);
        }
    }

    fn should_archive(&self, state: &TaskResourceState) -> bool {
        match self.config.archive_policy {
            ArchivePolicy::Always => true,
            ArchivePolicy::RespectTaskConfig => state.auto_archive_on_completion,
        }
    }

    /// Archive the server of `task_id` and stop tracking it.
    pub async fn archive_task_server(&self, task_id: &str) -> Result<(), OrchestratorError> {
        let (server_id, status) = {
            let active = self.active.read();
            let state = active
                .get(task_id)
                .ok_or_else(|| OrchestratorError::NotFound(task_id.to_string()))?;
            (state.server_id.clone(), state.status)
        };

        if let Err(e) = self.store.archive_task_server(task_id).await {
            error!("Failed to archive server for task {}: {}", task_id, e);
            return Err(e.into());
        }

        self.active.write().remove(task_id);
        info!("Archived task server {} ({:?})", server_id, status);

        self.events
            .publish(&ServerEvent::TaskServerArchived {
                task_id: task_id.to_string(),
                server_id,
                status,
            })
            .await;

        Ok(())
    }

    /// Rebuild the index from the persisted session.
    ///
    /// Restores active states whose server is not archived. Under
    /// [`ArchivePolicy::RespectTaskConfig`] finished tasks whose server was
    /// never archived are restored too, so they can still be archived by hand.
    /// Returns the number of restored tasks; a store failure restores nothing.
    pub async fn initialize_from_session(&self) -> usize {
        let session = match self.store.get_current_session().await {
            Ok(Some(session)) => session,
            Ok(None) => {
                debug!("No previous session to restore");
                return 0;
            }
            Err(e) => {
                error!("Failed to read session for restore: {}", e);
                return 0;
            }
        };

        let mut active = self.active.write();
        let mut restored = 0;
        let keep_finished = self.config.archive_policy == ArchivePolicy::RespectTaskConfig;
        for state in session
            .task_states
            .iter()
            .filter(|s| s.is_active() || keep_finished)
        {
            if session.is_server_archived(&state.server_id) {
                debug!("Skipping task {}: server archived", state.task_id);
                continue;
            }
            active.insert(state.task_id.clone(), state.clone());
            restored += 1;
        }

        info!("Restored {} task servers", restored);
        restored
    }

    /// Subscribe to one kind of lifecycle event.
    pub fn on_server_event(
        &self,
        kind: ServerEventKind,
        handler: Arc<dyn EventHandler>,
    ) -> SubscriptionId {
        self.events.subscribe(kind, handler)
    }

    /// Subscribe to every lifecycle event.
    pub fn on_any_server_event(&self, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        self.events.subscribe_all(handler)
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn get_task_state(&self, task_id: &str) -> Option<TaskResourceState> {
        self.active.read().get(task_id).cloned()
    }

    /// Snapshot of every tracked state, ordered by creation time.
    pub fn active_task_states(&self) -> Vec<TaskResourceState> {
        let mut states: Vec<_> = self.active.read().values().cloned().collect();
        states.sort_by_key(|s| s.created_at);
        states
    }

    pub fn active_count(&self) -> usize {
        self.active.read().len()
    }

    pub fn template_registry(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Template `config` would be created with.
    pub fn resolve_template(&self, config: &TaskServerConfig) -> Arc<TopologyTemplate> {
        self.templates
            .resolve(&config.task_type, config.template_id.as_deref())
    }

    /// Drop the index and every subscription.
    pub fn dispose(&self) {
        self.active.write().clear();
        self.events.clear();
        debug!("Orchestrator disposed");
    }
}

fn ids_of_kind(server: &Server, kind: ChannelKind) -> Vec<String> {
    server.channels_of_kind(kind).map(|c| c.id.clone()).collect()
}

fn first_of_kind(server: &Server, kind: ChannelKind) -> Option<String> {
    server.channels_of_kind(kind).next().map(|c| c.id.clone())
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
