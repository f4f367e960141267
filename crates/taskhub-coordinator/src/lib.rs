//! # TaskHub Coordinator
//!
//! Wires the session store, orchestrator, view tracker and UI surface into
//! one lifecycle.
//!
//! ## Components
//!
//! - [`LifecycleCoordinator`] - Ordered construction, restore, wiring and teardown
//! - [`SessionPersister`] - Full-session saves carrying the view selection
//! - [`ResourceScope`] - Scoped resources released in reverse order
//! - [`commands`] - Host commands: clear, export and status

pub mod bridge;
pub mod commands;
pub mod coordinator;
pub mod error;
pub mod maintenance;
pub mod persist;
pub mod scope;
pub mod surface;

pub use bridge::TrackerBridge;
pub use commands::{SessionAction, SessionStatus};
pub use coordinator::{CoordinatorState, LifecycleCoordinator};
pub use error::CoordinatorError;
pub use persist::{SerializedStore, SessionPersister};
pub use scope::{ResourceScope, ScopedResource, ShutdownSignal};
pub use surface::HeadlessSurface;
