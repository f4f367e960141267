//! # TaskHub Core
//!
//! Task server orchestration for the TaskHub framework.
//!
//! ## Components
//!
//! - [`TaskServerOrchestrator`] - Creates, tracks and archives task servers
//! - [`TemplateRegistry`] - Named topology templates and their resolution
//! - [`EventBus`] - Typed publish/subscribe for lifecycle events
//! - [`StateTracker`] - In-memory view state (unread counts, navigation)

pub mod error;
pub mod events;
pub mod orchestrator;
pub mod templates;
pub mod topology;
pub mod tracker;

pub use error::RegistryError;
pub use events::{EventBus, FnHandler, SubscriptionId};
pub use orchestrator::TaskServerOrchestrator;
pub use templates::TemplateRegistry;
pub use topology::{generate_topology, TopologyOptions};
pub use tracker::{ChannelView, ServerView, StateTracker, ViewState};
