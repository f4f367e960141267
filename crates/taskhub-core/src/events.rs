//! Typed event bus for task server lifecycle events.
//!
//! Subscriptions are keyed by [`ServerEventKind`]; a handler only sees the
//! kinds it subscribed to (or every kind via [`EventBus::subscribe_all`]).
//! Each delivery is isolated: a handler error or panic is logged and the
//! remaining handlers still receive the event.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::RwLock;
use tracing::{debug, error, warn};

use taskhub_protocols::{EventHandler, HandlerError, ServerEvent, ServerEventKind};

/// Handle returned by a subscription; used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    /// `None` receives every kind.
    kind: Option<ServerEventKind>,
    handler: Arc<dyn EventHandler>,
}

/// Event bus with per-kind subscriptions.
pub struct EventBus {
    next_id: AtomicU64,
    subscriptions: RwLock<Vec<Subscription>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscriptions: RwLock::new(Vec::new()),
        }
    }

    /// Subscribe `handler` to events of one kind.
    pub fn subscribe(&self, kind: ServerEventKind, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        self.insert(Some(kind), handler)
    }

    /// Subscribe `handler` to every event.
    pub fn subscribe_all(&self, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        self.insert(None, handler)
    }

    fn insert(&self, kind: Option<ServerEventKind>, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!("Subscribed handler '{}' to {:?}", handler.name(), kind);
        self.subscriptions.write().push(Subscription { id, kind, handler });
        id
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }

    /// Drop every subscription.
    pub fn clear(&self) {
        self.subscriptions.write().clear();
    }

    pub fn len(&self) -> usize {
        self.subscriptions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.read().is_empty()
    }

    /// Deliver `event` to every matching handler, in subscription order.
    pub async fn publish(&self, event: &ServerEvent) {
        let kind = event.kind();
        let task = event.task_id().unwrap_or("-");
        let handlers: Vec<Arc<dyn EventHandler>> = self
            .subscriptions
            .read()
            .iter()
            .filter(|s| s.kind.is_none_or(|k| k == kind))
            .map(|s| s.handler.clone())
            .collect();

        for handler in handlers {
            match AssertUnwindSafe(handler.handle(event)).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(
                    "Handler '{}' failed on {:?} for task {}: {}",
                    handler.name(),
                    kind,
                    task,
                    e
                ),
                Err(panic) => {
                    let e = HandlerError::Panicked(panic_message(panic.as_ref()));
                    error!("Handler '{}' on {:?} for task {}: {}", handler.name(), kind, task, e);
                }
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// [`EventHandler`] backed by a synchronous closure.
pub struct FnHandler<F> {
    name: String,
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&ServerEvent) -> Result<(), HandlerError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

#[async_trait]
impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&ServerEvent) -> Result<(), HandlerError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, event: &ServerEvent) -> Result<(), HandlerError> {
        (self.f)(event)
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
