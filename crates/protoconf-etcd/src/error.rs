//! Error types and utilities for etcd configuration operations.

use std::time::Duration;

/// Result type for all etcd configuration operations in this crate.
///
/// This is a convenience type alias that defaults to using [`Error`] as the error type.
/// Most functions in this crate return this type for consistent error handling.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type for etcd configuration operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport or protocol errors from the underlying etcd client
    #[error("etcd transport error: {0}")]
    Transport(#[from] etcd_client::Error),

    /// Operation timeout
    #[error("Operation timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Watch stream closed by the server or by cancellation
    #[error("Watch on prefix '{prefix}' closed: {reason}")]
    WatchClosed { prefix: String, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Generic operation error with context
    #[error("etcd operation failed: {operation} - {details}")]
    Operation { operation: String, details: String },
}

impl Error {
    /// Create a watch closed error
    pub fn watch_closed(prefix: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WatchClosed {
            prefix: prefix.into(),
            reason: reason.into(),
        }
    }

    /// Create an operation error with context
    pub fn operation(op: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Operation {
            operation: op.into(),
            details: details.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a timeout error with the given duration
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { timeout: duration }
    }

    /// Get a user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            Error::Transport(_) => {
                "Connection to the etcd cluster failed. Please check your connection.".to_string()
            }
            Error::Timeout { timeout } => {
                format!("Operation timed out after {:?}. Please try again.", timeout)
            }
            Error::WatchClosed { prefix, .. } => {
                format!("Live updates for '{}' have stopped.", prefix)
            }
            Error::InvalidConfig { reason } => format!("Configuration error: {}", reason),
            _ => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_error_message() {
        let err = Error::operation("txn_get", "connection refused");
        assert_eq!(
            err.to_string(),
            "etcd operation failed: txn_get - connection refused"
        );
    }

    #[test]
    fn test_invalid_config_user_message() {
        let err = Error::invalid_config("envkey cannot be empty");
        assert_eq!(
            err.user_message(),
            "Configuration error: envkey cannot be empty"
        );
    }

    #[test]
    fn test_watch_closed_error() {
        let err = Error::watch_closed("/prod/svc1/", "stream ended");
        assert_eq!(
            err.to_string(),
            "Watch on prefix '/prod/svc1/' closed: stream ended"
        );
        assert_eq!(
            err.user_message(),
            "Live updates for '/prod/svc1/' have stopped."
        );
    }

    #[test]
    fn test_timeout_error() {
        let err = Error::timeout(Duration::from_secs(5));
        assert!(err.to_string().contains("5s"));
    }
}
