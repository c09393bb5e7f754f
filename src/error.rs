//! Error handling for the agri_hub ingestion service.
//!
//! Line-protocol problems never surface here: the codec degrades them to
//! [`Reading::Unrecognized`](crate::protocol::Reading::Unrecognized). These
//! errors cover transport, startup and configuration failures only.

/// A specialized `Result` type for agri_hub operations.
pub type Result<T> = std::result::Result<T, HubError>;

/// The main error type for agri_hub.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The listening socket could not be set up. Fatal at startup.
    #[error("Failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    /// Per-connection network failure
    #[error("Network error: {0}")]
    Network(String),

    /// The client did not send anything within the read timeout
    #[error("Timed out after {0}ms waiting for sensor data")]
    Timeout(u64),

    /// Payload was not valid UTF-8
    #[error("Failed to decode payload: {0}")]
    Decode(#[from] std::str::Utf8Error),

    /// Web server error
    #[error("Web server error: {0}")]
    WebServer(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HubError {
    /// Create a new bind error
    pub fn bind_error(addr: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Bind {
            addr: addr.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a new network error
    pub fn network_error(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new web server error
    pub fn web_server_error(msg: impl Into<String>) -> Self {
        Self::WebServer(msg.into())
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error is fatal for the whole service rather than one
    /// connection.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Bind { .. } | Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_error_is_fatal() {
        let err = HubError::bind_error("0.0.0.0:6000", "address in use");
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "Failed to bind 0.0.0.0:6000: address in use"
        );
    }

    #[test]
    fn connection_errors_are_not_fatal() {
        assert!(!HubError::Timeout(2000).is_fatal());
        assert!(!HubError::network_error("reset by peer").is_fatal());
    }
}
