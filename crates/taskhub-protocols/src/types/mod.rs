//! Core types used throughout TaskHub.

mod server;
mod session;
mod state;
mod task;
mod template;

pub use server::*;
pub use session::*;
pub use state::*;
pub use task::*;
pub use template::*;

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
