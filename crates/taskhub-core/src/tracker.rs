//! In-memory view state: servers, channels, unread counts and selection.
//!
//! Every mutation emits a [`ViewStateChange`] on a broadcast channel. Sends
//! without receivers are dropped.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use taskhub_protocols::{
    Channel, ChannelKind, Server, ServerKind, ViewStateChange, ViewTracker,
};

const CHANGE_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelView {
    pub id: String,
    pub name: String,
    pub kind: ChannelKind,
    pub unread: u32,
}

impl From<&Channel> for ChannelView {
    fn from(channel: &Channel) -> Self {
        Self {
            id: channel.id.clone(),
            name: channel.name.clone(),
            kind: channel.kind,
            unread: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerView {
    pub id: String,
    pub name: String,
    pub kind: ServerKind,
    pub task_id: Option<String>,
    pub archived: bool,
    pub channels: Vec<ChannelView>,
}

impl ServerView {
    pub fn unread(&self) -> u32 {
        self.channels.iter().map(|c| c.unread).sum()
    }
}

impl From<&Server> for ServerView {
    fn from(server: &Server) -> Self {
        Self {
            id: server.id.clone(),
            name: server.name.clone(),
            kind: server.kind,
            task_id: server.task_id.clone(),
            archived: server.archived,
            channels: server.channels.iter().map(ChannelView::from).collect(),
        }
    }
}

/// Snapshot of the whole view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub servers: Vec<ServerView>,
    pub active_server_id: Option<String>,
    pub active_channel_id: Option<String>,
}

impl ViewState {
    fn channel_mut(&mut self, channel_id: &str) -> Option<&mut ChannelView> {
        self.servers
            .iter_mut()
            .flat_map(|s| s.channels.iter_mut())
            .find(|c| c.id == channel_id)
    }
}

/// [`ViewTracker`] backed by an in-memory [`ViewState`].
pub struct StateTracker {
    state: RwLock<ViewState>,
    changes: broadcast::Sender<ViewStateChange>,
}

impl StateTracker {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            state: RwLock::new(ViewState::default()),
            changes,
        }
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.read().clone()
    }

    pub fn server_count(&self) -> usize {
        self.state.read().servers.len()
    }

    fn emit(&self, change: ViewStateChange) {
        let _ = self.changes.send(change);
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTracker for StateTracker {
    fn add_server(&self, server: &Server) {
        {
            let mut state = self.state.write();
            let view = ServerView::from(server);
            match state.servers.iter_mut().find(|s| s.id == server.id) {
                Some(existing) => *existing = view,
                None => state.servers.push(view),
            }
        }
        debug!("Tracking server {}", server.id);
        self.emit(ViewStateChange::ServerAdded {
            server_id: server.id.clone(),
        });
    }

    fn add_channel(&self, channel: &Channel, server_id: &str) {
        {
            let mut state = self.state.write();
            let Some(server) = state.servers.iter_mut().find(|s| s.id == server_id) else {
                debug!("Ignoring channel {} for untracked server {}", channel.id, server_id);
                return;
            };
            if server.channels.iter().any(|c| c.id == channel.id) {
                return;
            }
            server.channels.push(ChannelView::from(channel));
        }
        self.emit(ViewStateChange::ChannelAdded {
            server_id: server_id.to_string(),
            channel_id: channel.id.clone(),
        });
    }

    fn mark_server_archived(&self, server_id: &str) {
        {
            let mut state = self.state.write();
            match state.servers.iter_mut().find(|s| s.id == server_id) {
                Some(server) if !server.archived => server.archived = true,
                _ => return,
            }
        }
        self.emit(ViewStateChange::ServerArchived {
            server_id: server_id.to_string(),
        });
    }

    fn cleanup_archived_servers(&self) -> usize {
        let (removed, selection_cleared) = {
            let mut state = self.state.write();
            let before = state.servers.len();
            state.servers.retain(|s| !s.archived);
            let removed = before - state.servers.len();

            let dangling = state
                .active_server_id
                .as_ref()
                .is_some_and(|id| !state.servers.iter().any(|s| &s.id == id));
            if dangling {
                state.active_server_id = None;
                state.active_channel_id = None;
            }
            (removed, dangling)
        };

        if removed > 0 {
            debug!("Removed {} archived servers from view", removed);
            self.emit(ViewStateChange::ArchivedPurged { count: removed });
        }
        if selection_cleared {
            self.emit(ViewStateChange::SelectionChanged {
                server_id: None,
                channel_id: None,
            });
        }
        removed
    }

    fn record_message(&self, channel_id: &str) {
        let unread = {
            let mut state = self.state.write();
            let active = state.active_channel_id.as_deref() == Some(channel_id);
            let Some(channel) = state.channel_mut(channel_id) else {
                return;
            };
            if active {
                return;
            }
            channel.unread = channel.unread.saturating_add(1);
            channel.unread
        };
        self.emit(ViewStateChange::UnreadChanged {
            channel_id: channel_id.to_string(),
            unread,
        });
    }

    fn mark_read(&self, channel_id: &str) {
        {
            let mut state = self.state.write();
            match state.channel_mut(channel_id) {
                Some(channel) if channel.unread > 0 => channel.unread = 0,
                _ => return,
            }
        }
        self.emit(ViewStateChange::UnreadChanged {
            channel_id: channel_id.to_string(),
            unread: 0,
        });
    }

    fn select(&self, server_id: Option<String>, channel_id: Option<String>) {
        let cleared = {
            let mut state = self.state.write();
            state.active_server_id = server_id.clone();
            state.active_channel_id = channel_id.clone();
            match channel_id.as_deref().and_then(|id| state.channel_mut(id)) {
                Some(channel) if channel.unread > 0 => {
                    channel.unread = 0;
                    true
                }
                _ => false,
            }
        };
        if cleared {
            if let Some(id) = &channel_id {
                self.emit(ViewStateChange::UnreadChanged {
                    channel_id: id.clone(),
                    unread: 0,
                });
            }
        }
        self.emit(ViewStateChange::SelectionChanged {
            server_id,
            channel_id,
        });
    }

    fn active_selection(&self) -> (Option<String>, Option<String>) {
        let state = self.state.read();
        (state.active_server_id.clone(), state.active_channel_id.clone())
    }

    fn total_unread_count(&self) -> u32 {
        self.state.read().servers.iter().map(ServerView::unread).sum()
    }

    fn on_state_change(&self) -> broadcast::Receiver<ViewStateChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
