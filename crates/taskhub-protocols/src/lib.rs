//! # TaskHub Protocols
//!
//! Core protocol definitions for the TaskHub framework.
//! Contains the data model, lifecycle events and collaborator traits only,
//! no implementations.
//!
//! ## Core Traits
//!
//! - [`SessionStore`] - Durable persistence of servers, channels and task state
//! - [`ViewTracker`] - View-facing mirror of the server hierarchy
//! - [`UiSurface`] - Host-registered visual surface
//! - [`EventHandler`] - Subscriber for orchestrator lifecycle events

pub mod error;
pub mod events;
pub mod store;
pub mod surface;
pub mod tracker;
pub mod types;

pub use error::{HandlerError, OrchestratorError, StoreError};
pub use events::{EventHandler, ServerEvent, ServerEventKind};
pub use store::SessionStore;
pub use surface::UiSurface;
pub use tracker::{ViewStateChange, ViewTracker};
pub use types::*;
