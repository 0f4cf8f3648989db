//! Error reporting shared by the engine and the command line front end
//!
//! Errors that a user can fix (bad capacity, unreadable config file, a typo
//! in a script line) are reported with their own message. Everything else is
//! reported against the operation that failed, with detail at debug level.

/// Errors that know whether their message is fit to show a user
///
/// When `is_user_actionable()` is `true`, `user_message()` must return
/// `Some(message)`. When it is `false`, `user_message()` returns `None`.
pub trait ContextualError: std::error::Error {
    /// True when the error carries a message the user can act on, such as
    /// a validation failure or a configuration mistake
    fn is_user_actionable(&self) -> bool;

    /// The actionable message, if any
    fn user_message(&self) -> Option<&str>;
}

/// Primary line reported for `error` while performing `operation_context`
pub fn headline<'a, E: ContextualError>(error: &'a E, operation_context: &'a str) -> &'a str {
    if error.is_user_actionable() {
        error.user_message().unwrap_or(operation_context)
    } else {
        operation_context
    }
}

/// Log a fatal error with detail suited to its kind
///
/// # Examples
/// ```rust
/// use toastline::core::error_handling::log_error_with_context;
/// use toastline::notifications::api::NotificationError;
///
/// let err = NotificationError::InvalidCapacity { capacity: 0 };
/// // Logs: "FATAL: Notification capacity must be at least 1"
/// log_error_with_context(&err, "Starting notification engine");
///
/// let err = NotificationError::NoRuntime;
/// // Logs: "FATAL: Starting notification engine"
/// log_error_with_context(&err, "Starting notification engine");
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    log::error!("FATAL: {}", headline(error, operation_context));
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::startup::StartupError;
    use crate::notifications::api::{ConfigError, NotificationError};

    #[test]
    fn test_user_actionable_error_uses_own_message() {
        let error = NotificationError::InvalidTickInterval;
        assert_eq!(
            headline(&error, "Starting engine"),
            "Timer tick interval must be greater than zero"
        );
    }

    #[test]
    fn test_system_error_uses_operation_context() {
        let error = NotificationError::NoRuntime;
        assert_eq!(headline(&error, "Starting engine"), "Starting engine");
    }

    #[test]
    fn test_nested_config_error_surfaces_message() {
        let error = StartupError::from(ConfigError::Invalid {
            key: "engine.capacity".to_string(),
            message: "capacity must be a positive integer".to_string(),
        });
        assert_eq!(
            headline(&error, "Loading configuration"),
            "capacity must be a positive integer"
        );
    }

    #[test]
    fn test_logging_does_not_panic_without_logger() {
        log_error_with_context(&NotificationError::NoRuntime, "Starting engine");
    }
}
