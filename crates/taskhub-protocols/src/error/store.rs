//! Session store errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session record not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = StoreError::NotFound("server-1".to_string());
        let display = err.to_string();
        assert!(display.contains("not found"));
        assert!(display.contains("server-1"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StoreError::from(io_err);
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_serde_error_from() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = StoreError::from(serde_err);
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
