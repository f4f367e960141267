//! Background loops: change-driven saves, periodic saves and cleanup.
//!
//! Each loop runs until the shutdown signal fires.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};

use taskhub_protocols::{ViewStateChange, ViewTracker};

use crate::persist::SessionPersister;

/// Save the session after every tracker change.
pub async fn run_change_listener(
    persister: Arc<SessionPersister>,
    mut changes: broadcast::Receiver<ViewStateChange>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    debug!("Starting change listener");

    loop {
        tokio::select! {
            change = changes.recv() => {
                match change {
                    Ok(change) => debug!("View changed: {:?}", change),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Change listener lagged, {} changes coalesced", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
                if let Err(e) = persister.persist().await {
                    error!("Failed to save session after change: {}", e);
                }
            }
            _ = shutdown_rx.recv() => {
                debug!("Change listener shutting down");
                break;
            }
        }
    }
}

/// Save the session every `interval`, independent of changes.
pub async fn run_save_loop(
    persister: Arc<SessionPersister>,
    interval: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    info!("Starting session save loop (interval: {:?})", interval);

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                if let Err(e) = persister.persist().await {
                    error!("Periodic session save failed: {}", e);
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Session save loop shutting down");
                break;
            }
        }
    }
}

/// Drop archived servers from the view every `interval`.
pub async fn run_cleanup_loop(
    tracker: Arc<dyn ViewTracker>,
    interval: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    info!("Starting archived server cleanup loop (interval: {:?})", interval);

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                let removed = tracker.cleanup_archived_servers();
                if removed > 0 {
                    info!("Cleaned up {} archived servers", removed);
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Cleanup loop shutting down");
                break;
            }
        }
    }
}
