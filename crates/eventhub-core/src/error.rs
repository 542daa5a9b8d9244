use thiserror::Error;

use crate::config_manager::ConfigError;

#[derive(Error, Debug)]
pub enum EventHubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl EventHubError {
    /// Whether the failure came from a collaborator being unreachable or
    /// missing data, as opposed to a caller mistake.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            EventHubError::NotFound(_) | EventHubError::Unavailable(_) | EventHubError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EventHubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failure_classification() {
        assert!(EventHubError::NotFound("profile s9".into()).is_fetch_failure());
        assert!(EventHubError::Unavailable("backend down".into()).is_fetch_failure());
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(EventHubError::from(io).is_fetch_failure());

        assert!(!EventHubError::Validation("matric_no".into()).is_fetch_failure());
        assert!(!EventHubError::InvalidOperation("no runtime".into()).is_fetch_failure());
        assert!(!EventHubError::Storage("corrupt".into()).is_fetch_failure());
    }
}
