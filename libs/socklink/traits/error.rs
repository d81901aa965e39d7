use std::time::Duration;
use thiserror::Error;

/// Main error type for socklink
#[derive(Error, Debug)]
pub enum SockLinkError {
    /// A status name or encoding that is not one of the three known states
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// `start`/`stop` did not reach the target state in time
    #[error("Connection timed out: {operation} did not settle within {timeout:?}")]
    ConnectionTimeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// Transport adapter failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SockLinkError {
    /// Check if this error is a start/stop timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, SockLinkError::ConnectionTimeout { .. })
    }
}

/// Result type for socklink operations
pub type Result<T> = std::result::Result<T, SockLinkError>;
