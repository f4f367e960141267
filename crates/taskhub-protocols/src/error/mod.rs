//! Error types for the TaskHub protocol layer.

mod handler;
mod orchestrator;
mod store;

pub use handler::*;
pub use orchestrator::*;
pub use store::*;
