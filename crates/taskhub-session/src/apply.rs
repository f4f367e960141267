//! Session mutations shared by every store.

use tracing::debug;

use taskhub_protocols::{Channel, Server, Session, StoreError, TaskResourceState};

pub(crate) fn add_server(session: &mut Session, server: &Server) {
    session.upsert_server(server.clone());
}

pub(crate) fn add_channel(
    session: &mut Session,
    server_id: &str,
    channel: &Channel,
) -> Result<(), StoreError> {
    let server = session
        .server_mut(server_id)
        .ok_or_else(|| StoreError::NotFound(server_id.to_string()))?;
    match server.channels.iter_mut().find(|c| c.id == channel.id) {
        Some(existing) => *existing = channel.clone(),
        None => server.channels.push(channel.clone()),
    }
    server.last_activity = channel.last_activity.max(server.last_activity);
    Ok(())
}

/// Returns how many servers were flagged.
pub(crate) fn archive_task_server(session: &mut Session, task_id: &str) -> usize {
    let mut flagged = 0;
    for server in session
        .servers
        .iter_mut()
        .filter(|s| s.task_id.as_deref() == Some(task_id) && !s.archived)
    {
        server.archived = true;
        flagged += 1;
    }
    if flagged == 0 {
        debug!("No unarchived server owned by task {}", task_id);
    }
    flagged
}

pub(crate) fn upsert_task_state(session: &mut Session, state: &TaskResourceState) {
    session.upsert_task_state(state.clone());
}
