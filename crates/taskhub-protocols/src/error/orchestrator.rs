//! Orchestrator errors.

use thiserror::Error;

use super::StoreError;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No active task server is tracked for this task id.
    #[error("Task server not found for task: {0}")]
    NotFound(String),

    /// The session store rejected a write or read.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl OrchestratorError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = OrchestratorError::NotFound("task-9".to_string());
        assert!(err.is_not_found());
        assert!(err.to_string().contains("task-9"));
    }

    #[test]
    fn test_persistence_from_store_error() {
        let err = OrchestratorError::from(StoreError::Unavailable("disk full".to_string()));
        assert!(!err.is_not_found());
        let display = err.to_string();
        assert!(display.contains("Persistence"));
        assert!(display.contains("disk full"));
    }
}
