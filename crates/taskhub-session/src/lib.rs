//! # TaskHub Session
//!
//! Durable storage of the session: servers, channels, task states and
//! navigation state.
//!
//! ## Stores
//!
//! - [`MemorySessionStore`] - In-process store, used by tests and `--ephemeral` runs
//! - [`FileSessionStore`] - One JSON file, replaced atomically on every write

mod apply;
pub mod file;
pub mod memory;

pub use file::{FileSessionStore, SESSION_FILE_NAME};
pub use memory::MemorySessionStore;
