//! Lifecycle coordinator.
//!
//! Builds the components in dependency order (store, orchestrator, view
//! tracker, UI surface), restores the previous session, wires events between
//! them and starts the maintenance loops. Everything acquired on the way is
//! recorded in a [`ResourceScope`] and released in reverse on dispose.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use taskhub_config::Config;
use taskhub_core::{StateTracker, TaskServerOrchestrator};
use taskhub_protocols::{SessionStore, UiSurface, ViewTracker};

use crate::bridge::TrackerBridge;
use crate::error::CoordinatorError;
use crate::maintenance::{run_change_listener, run_cleanup_loop, run_save_loop};
use crate::persist::{SerializedStore, SessionPersister};
use crate::scope::{ResourceScope, ScopedResource, ShutdownSignal};

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CoordinatorState {
    Running = 0,
    Disposing = 1,
    Disposed = 2,
}

impl From<u8> for CoordinatorState {
    fn from(v: u8) -> Self {
        match v {
            1 => CoordinatorState::Disposing,
            2 => CoordinatorState::Disposed,
            _ => CoordinatorState::Running,
        }
    }
}

/// Owns the running system.
pub struct LifecycleCoordinator {
    store: Arc<SerializedStore>,
    orchestrator: Arc<TaskServerOrchestrator>,
    tracker: Arc<StateTracker>,
    persister: Arc<SessionPersister>,
    surface: Arc<dyn UiSurface>,
    shutdown: ShutdownSignal,
    resources: ResourceScope,
    state: AtomicU8,
}

impl LifecycleCoordinator {
    /// Build, restore and start everything.
    ///
    /// Only template registration can fail; a failed restore is logged and
    /// the coordinator starts with an empty view.
    pub async fn start(
        config: &Config,
        store: Arc<dyn SessionStore>,
        surface: Arc<dyn UiSurface>,
    ) -> Result<Self, CoordinatorError> {
        info!("Starting lifecycle coordinator...");

        let store = Arc::new(SerializedStore::new(store));
        let orchestrator = Arc::new(TaskServerOrchestrator::with_templates(
            store.clone(),
            config.templates.clone(),
            config.orchestrator.clone(),
        )?);
        let tracker = Arc::new(StateTracker::new());
        let persister = Arc::new(SessionPersister::new(store.clone(), tracker.clone()));

        info!(
            "Registered surface {} (retains state when hidden: {})",
            surface.id(),
            surface.retains_state_when_hidden()
        );

        let coordinator = Self {
            store,
            orchestrator,
            tracker,
            persister,
            surface,
            shutdown: ShutdownSignal::new(),
            resources: ResourceScope::new(),
            state: AtomicU8::new(CoordinatorState::Running as u8),
        };

        coordinator.wire_events();
        if config.coordinator.restore_on_start {
            coordinator.restore().await;
        } else {
            debug!("Session restore disabled");
        }
        coordinator.spawn_loops(config);

        info!("Lifecycle coordinator started");
        Ok(coordinator)
    }

    fn wire_events(&self) {
        let bridge = Arc::new(TrackerBridge::new(self.tracker.clone()));
        for kind in TrackerBridge::KINDS {
            let id = self.orchestrator.on_server_event(kind, bridge.clone());
            let events = self.orchestrator.events().clone();
            self.resources.push(ScopedResource::new(
                format!("tracker-bridge:{:?}", kind),
                move || {
                    events.unsubscribe(id);
                },
            ));
        }
    }

    /// Restore the orchestrator index and the view from the stored session.
    async fn restore(&self) {
        let session = match self.store.get_current_session().await {
            Ok(Some(session)) => session,
            Ok(None) => {
                info!("No previous session found, starting fresh");
                return;
            }
            Err(e) => {
                error!("Failed to restore session, starting fresh: {}", e);
                return;
            }
        };

        let summary = session.summary();
        info!(
            "Restoring session {}: {} servers ({} archived), {} channels, {} active tasks",
            summary.session_id,
            summary.server_count,
            summary.archived_server_count,
            summary.channel_count,
            summary.active_task_count
        );

        self.orchestrator.initialize_from_session().await;

        for server in session.servers.iter().filter(|s| !s.archived) {
            self.tracker.add_server(server);
        }
        if session.active_server_id.is_some() {
            self.tracker.select(
                session.active_server_id.clone(),
                session.active_channel_id.clone(),
            );
        }
    }

    fn spawn_loops(&self, config: &Config) {
        let listener = tokio::spawn(run_change_listener(
            self.persister.clone(),
            self.tracker.on_state_change(),
            self.shutdown.subscribe(),
        ));
        self.resources.push(ScopedResource::task("change-listener", listener));

        let save = tokio::spawn(run_save_loop(
            self.persister.clone(),
            config.coordinator.save_interval(),
            self.shutdown.subscribe(),
        ));
        self.resources.push(ScopedResource::task("save-loop", save));

        let tracker: Arc<dyn ViewTracker> = self.tracker.clone();
        let cleanup = tokio::spawn(run_cleanup_loop(
            tracker,
            config.coordinator.cleanup_interval(),
            self.shutdown.subscribe(),
        ));
        self.resources.push(ScopedResource::task("cleanup-loop", cleanup));
    }

    pub fn state(&self) -> CoordinatorState {
        CoordinatorState::from(self.state.load(Ordering::SeqCst))
    }

    pub fn is_running(&self) -> bool {
        self.state() == CoordinatorState::Running
    }

    pub fn orchestrator(&self) -> &Arc<TaskServerOrchestrator> {
        &self.orchestrator
    }

    pub fn tracker(&self) -> &Arc<StateTracker> {
        &self.tracker
    }

    /// The store every component writes through.
    pub fn store(&self) -> Arc<dyn SessionStore> {
        self.store.clone()
    }

    pub fn persister(&self) -> &Arc<SessionPersister> {
        &self.persister
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Save the session now. Fails once disposal has started.
    pub async fn persist_now(&self) -> Result<(), CoordinatorError> {
        if !self.is_running() {
            return Err(CoordinatorError::InvalidState(format!(
                "cannot save while {:?}",
                self.state()
            )));
        }
        self.persister.persist().await?;
        Ok(())
    }

    /// Bring the UI surface to the foreground.
    pub fn reveal(&self) {
        self.surface.reveal();
    }

    /// Stop the loops, release resources in reverse order and dispose the
    /// orchestrator and surface. Later calls do nothing.
    pub async fn dispose(&self) {
        if self
            .state
            .compare_exchange(
                CoordinatorState::Running as u8,
                CoordinatorState::Disposing as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            debug!("Coordinator already disposed");
            return;
        }

        info!("Disposing lifecycle coordinator...");

        if let Err(e) = self.persister.persist().await {
            warn!("Final session save failed: {}", e);
        }

        self.shutdown.trigger();
        let released = self.resources.release_all();
        self.orchestrator.dispose();
        self.surface.dispose();

        self.state
            .store(CoordinatorState::Disposed as u8, Ordering::SeqCst);
        info!("Lifecycle coordinator disposed ({} resources released)", released);
    }
}

impl Drop for LifecycleCoordinator {
    /// Stop the loops of a coordinator that was never disposed.
    fn drop(&mut self) {
        if self.resources.is_empty() {
            return;
        }
        warn!("Lifecycle coordinator dropped without dispose; stopping loops");
        self.shutdown.trigger();
        self.resources.release_all();
    }
}
