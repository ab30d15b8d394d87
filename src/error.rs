//! Error types for the federation engine

use thiserror::Error;

/// Result type alias for federation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    #[error("Federation is not allowed for organization '{organization_id}'")]
    NotAllowed { organization_id: String },

    #[error("Integration not found: {0}")]
    IntegrationNotFound(String),

    #[error("Ingestion job not found: {0}")]
    JobNotFound(String),

    #[error("Integration '{integration_id}' still has {count} federated API(s)")]
    AssociatedApisFound { integration_id: String, count: usize },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Store(String),

    #[error("Integration agent error: {0}")]
    Agent(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Shorthand for a storage failure with context
    pub fn store(msg: impl Into<String>) -> Self {
        Error::Store(msg.into())
    }

    /// Shorthand for an agent failure with context
    pub fn agent(msg: impl Into<String>) -> Self {
        Error::Agent(msg.into())
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_allowed_names_organization() {
        let err = Error::NotAllowed {
            organization_id: "org-1".to_string(),
        };
        assert!(err.to_string().contains("org-1"));
    }

    #[test]
    fn test_integration_not_found_message() {
        let err = Error::IntegrationNotFound("int-42".to_string());
        assert!(err.to_string().contains("int-42"));
    }

    #[test]
    fn test_associated_apis_found_reports_count() {
        let err = Error::AssociatedApisFound {
            integration_id: "int-1".to_string(),
            count: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("int-1"));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_config_error_wraps_into_top_level() {
        let err: Error = ConfigError::Invalid("bad knob".to_string()).into();
        assert!(err.to_string().contains("bad knob"));
    }
}
