//! Host commands: clear, export and status.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use taskhub_protocols::{SessionStore, SessionSummary};

use crate::error::CoordinatorError;

/// Action offered alongside the session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionAction {
    Clear,
    Export,
    View,
}

impl SessionAction {
    pub const ALL: [SessionAction; 3] = [Self::Clear, Self::Export, Self::View];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Export => "export",
            Self::View => "view",
        }
    }
}

/// Result of the status command.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    /// `None` when no session was ever saved.
    pub summary: Option<SessionSummary>,
    pub actions: Vec<SessionAction>,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.summary {
            Some(s) => {
                writeln!(f, "Session:   {}", s.session_id)?;
                writeln!(f, "Updated:   {}", s.timestamp.to_rfc3339())?;
                writeln!(f, "Servers:   {} ({} archived)", s.server_count, s.archived_server_count)?;
                writeln!(f, "Channels:  {}", s.channel_count)?;
                writeln!(
                    f,
                    "Tasks:     {} active, {} completed, {} failed",
                    s.active_task_count, s.completed_task_count, s.failed_task_count
                )?;
                writeln!(f, "Messages:  {}", s.message_count)?;
            }
            None => writeln!(f, "No session stored")?,
        }
        let actions: Vec<_> = self.actions.iter().map(SessionAction::as_str).collect();
        write!(f, "Actions:   {}", actions.join(", "))
    }
}

/// Drop the stored session.
pub async fn clear_session(store: &dyn SessionStore) -> Result<(), CoordinatorError> {
    store.clear_session().await?;
    info!("Session cleared");
    Ok(())
}

/// Write the session summary as pretty JSON to `path`.
///
/// Only ids, timestamps and counts are written; message content never is.
pub async fn export_session(
    store: &dyn SessionStore,
    path: &Path,
) -> Result<SessionSummary, CoordinatorError> {
    let session = store
        .get_current_session()
        .await?
        .ok_or_else(|| CoordinatorError::NoSession("export".to_string()))?;
    let summary = session.summary();
    let json = serde_json::to_string_pretty(&summary)?;
    tokio::fs::write(path, json).await?;
    info!("Exported session {} to {:?}", summary.session_id, path);
    Ok(summary)
}

/// Session counts plus the actions available on it.
pub async fn session_status(store: &dyn SessionStore) -> Result<SessionStatus, CoordinatorError> {
    let summary = store.get_current_session().await?.map(|s| s.summary());
    let actions = match summary {
        Some(_) => SessionAction::ALL.to_vec(),
        None => vec![SessionAction::View],
    };
    Ok(SessionStatus { summary, actions })
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
