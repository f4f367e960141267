//! View tracker protocol definitions.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{Channel, Server};

/// Change notification emitted by a view tracker after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewStateChange {
    ServerAdded { server_id: String },
    ChannelAdded { server_id: String, channel_id: String },
    ServerArchived { server_id: String },
    ArchivedPurged { count: usize },
    UnreadChanged { channel_id: String, unread: u32 },
    SelectionChanged {
        server_id: Option<String>,
        channel_id: Option<String>,
    },
}

/// View-facing mirror of the server hierarchy.
pub trait ViewTracker: Send + Sync {
    fn add_server(&self, server: &Server);

    fn add_channel(&self, channel: &Channel, server_id: &str);

    fn mark_server_archived(&self, server_id: &str);

    /// Drop archived servers from the view. Returns how many were removed.
    fn cleanup_archived_servers(&self) -> usize;

    /// Count one unread message on a channel.
    fn record_message(&self, channel_id: &str);

    fn mark_read(&self, channel_id: &str);

    fn select(&self, server_id: Option<String>, channel_id: Option<String>);

    /// Currently selected server and channel ids.
    fn active_selection(&self) -> (Option<String>, Option<String>);

    fn total_unread_count(&self) -> u32;

    /// Subscribe to change notifications.
    fn on_state_change(&self) -> broadcast::Receiver<ViewStateChange>;
}
