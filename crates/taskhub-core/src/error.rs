//! Core errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Template already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Template cannot be removed: {0}")]
    Protected(String),

    #[error("Template not found: {0}")]
    NotFound(String),
}
