//! Shutdown signalling and scoped resources.

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

/// Broadcast shutdown signal for the maintenance loops.
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    pub fn trigger(&self) {
        let _ = self.sender.send(());
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Something acquired during startup that must be released at teardown.
pub struct ScopedResource {
    name: String,
    release: Box<dyn FnOnce() + Send>,
}

impl ScopedResource {
    pub fn new(name: impl Into<String>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            name: name.into(),
            release: Box::new(release),
        }
    }

    /// A spawned task, aborted on release if it is still running.
    pub fn task(name: impl Into<String>, handle: JoinHandle<()>) -> Self {
        let abort = handle.abort_handle();
        Self::new(name, move || abort.abort())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Resources in acquisition order.
#[derive(Default)]
pub struct ResourceScope {
    resources: Mutex<Vec<ScopedResource>>,
}

impl ResourceScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, resource: ScopedResource) {
        debug!("Acquired resource: {}", resource.name);
        self.resources.lock().push(resource);
    }

    pub fn len(&self) -> usize {
        self.resources.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.lock().is_empty()
    }

    /// Release everything, last acquired first. Returns how many were released.
    pub fn release_all(&self) -> usize {
        let resources = std::mem::take(&mut *self.resources.lock());
        let count = resources.len();
        for resource in resources.into_iter().rev() {
            debug!("Releasing resource: {}", resource.name);
            (resource.release)();
        }
        count
    }
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
