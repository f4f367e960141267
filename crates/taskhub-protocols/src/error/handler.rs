//! Event handler errors.

use thiserror::Error;

/// Failure reported by an event subscriber. Never propagated to publishers.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Handler failed: {0}")]
    Failed(String),

    #[error("Handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
