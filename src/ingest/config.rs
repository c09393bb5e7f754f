//! Sensor listener configuration.

use crate::error::{HubError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the sensor ingestion listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Host to bind the listener to
    pub host: String,
    /// TCP port sensors connect to
    pub port: u16,
    /// Size of the single receive performed per connection
    pub read_buffer_bytes: usize,
    /// How long a connected client may take to send its line
    pub read_timeout_ms: u64,
    /// Listen backlog passed to the socket
    pub backlog: u32,
    /// Maximum length of every metric history
    pub history_capacity: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: crate::DEFAULT_SENSOR_PORT,
            read_buffer_bytes: 1024,
            read_timeout_ms: 2000,
            backlog: 128,
            history_capacity: crate::DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl IngestConfig {
    /// Create a new ingest configuration with custom host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_read_buffer_bytes(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes;
        self
    }

    pub fn with_read_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.read_timeout_ms = timeout_ms;
        self
    }

    pub fn with_backlog(mut self, backlog: u32) -> Self {
        self.backlog = backlog;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Get the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Reject settings that would make the listener unusable.
    pub fn validate(&self) -> Result<()> {
        if self.read_buffer_bytes == 0 {
            return Err(HubError::config_error("read buffer must be at least one byte"));
        }
        if self.read_timeout_ms == 0 {
            return Err(HubError::config_error("read timeout must be non-zero"));
        }
        if self.history_capacity == 0 {
            return Err(HubError::config_error("history capacity must be non-zero"));
        }
        if self.backlog == 0 {
            return Err(HubError::config_error("listen backlog must be non-zero"));
        }
        Ok(())
    }
}
