//! Forwards orchestrator events into the view tracker.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use taskhub_protocols::{EventHandler, HandlerError, ServerEvent, ServerEventKind, ViewTracker};

/// Event handler that mirrors server lifecycle events into a [`ViewTracker`].
pub struct TrackerBridge {
    tracker: Arc<dyn ViewTracker>,
}

impl TrackerBridge {
    /// Event kinds the bridge is subscribed to.
    pub const KINDS: [ServerEventKind; 3] = [
        ServerEventKind::TaskServerCreated,
        ServerEventKind::AgentChannelAdded,
        ServerEventKind::TaskServerArchived,
    ];

    pub fn new(tracker: Arc<dyn ViewTracker>) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl EventHandler for TrackerBridge {
    fn name(&self) -> &str {
        "tracker-bridge"
    }

    async fn handle(&self, event: &ServerEvent) -> Result<(), HandlerError> {
        match event {
            ServerEvent::TaskServerCreated { server, .. } => self.tracker.add_server(server),
            ServerEvent::AgentChannelAdded {
                server_id, channel, ..
            } => self.tracker.add_channel(channel, server_id),
            ServerEvent::TaskServerArchived { server_id, .. } => {
                self.tracker.mark_server_archived(server_id)
            }
            ServerEvent::TaskProgressUpdated { .. } => {
                debug!("Tracker bridge ignores progress updates");
            }
        }
        Ok(())
    }
}
