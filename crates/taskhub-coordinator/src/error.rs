//! Coordinator errors.

use thiserror::Error;

use taskhub_core::RegistryError;
use taskhub_protocols::{OrchestratorError, StoreError};

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),

    #[error("Template error: {0}")]
    Template(#[from] RegistryError),

    #[error("No session to {0}")]
    NoSession(String),

    #[error("Invalid coordinator state: {0}")]
    InvalidState(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
