//! Error types for the notification engine
//!
//! Runtime operations never fail: acting on an id that is already gone is a
//! no-op. Errors only arise from misconfiguration at construction time.

use std::path::PathBuf;

use crate::core::error_handling::ContextualError;

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification capacity must be at least 1 (got {capacity})")]
    InvalidCapacity { capacity: usize },

    #[error("Timer tick interval must be greater than zero")]
    InvalidTickInterval,

    #[error("No tokio runtime available to schedule notification timers")]
    NoRuntime,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file does not exist: {}", path.display())]
    Missing { path: PathBuf },

    #[error("Error reading configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration value for '{key}': {message}")]
    Invalid { key: String, message: String },
}

/// Error a subscriber may report back from a snapshot callback
pub type SubscriberError = Box<dyn std::error::Error + Send + Sync>;

pub type NotificationResult<T> = Result<T, NotificationError>;

impl ContextualError for NotificationError {
    fn is_user_actionable(&self) -> bool {
        match self {
            NotificationError::InvalidCapacity { .. } | NotificationError::InvalidTickInterval => {
                true
            }
            NotificationError::NoRuntime => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            NotificationError::InvalidCapacity { .. } => {
                Some("Notification capacity must be at least 1")
            }
            NotificationError::InvalidTickInterval => {
                Some("Timer tick interval must be greater than zero")
            }
            NotificationError::NoRuntime => None,
        }
    }
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Missing { .. } => Some("The specified configuration file does not exist"),
            ConfigError::Read { .. } => Some("The configuration file could not be read"),
            ConfigError::Parse { .. } => Some("The configuration file is not valid TOML"),
            ConfigError::Invalid { message, .. } => Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_error_is_user_actionable() {
        let err = NotificationError::InvalidCapacity { capacity: 0 };
        assert!(err.is_user_actionable());
        assert!(err.user_message().is_some());
        assert!(err.to_string().contains("got 0"));
    }

    #[test]
    fn test_missing_runtime_is_system_error() {
        let err = NotificationError::NoRuntime;
        assert!(!err.is_user_actionable());
        assert_eq!(err.user_message(), None);
    }

    #[test]
    fn test_invalid_config_value_message_passes_through() {
        let err = ConfigError::Invalid {
            key: "capacity".to_string(),
            message: "must be at least 1".to_string(),
        };
        assert!(err.is_user_actionable());
        assert_eq!(err.user_message(), Some("must be at least 1"));
    }
}
