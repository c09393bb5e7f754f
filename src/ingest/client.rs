//! One-shot sensor client: connect, send a line, wait briefly for `OK`.
//!
//! This is the same exchange every sensor performs per reading. It backs the
//! `send` CLI command and the end-to-end tests.

use crate::error::{HubError, Result};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Default time a client waits for the connection and for the acknowledgement.
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(1);

/// Send `line` to the hub at `addr`.
///
/// Returns the acknowledgement text, or `None` if the hub closed or stayed
/// silent past `wait`. Only connecting and writing are errors.
pub async fn send_reading(addr: &str, line: &str, wait: Duration) -> Result<Option<String>> {
    let mut stream = timeout(wait, TcpStream::connect(addr))
        .await
        .map_err(|_| HubError::network_error(format!("timed out connecting to {}", addr)))?
        .map_err(|e| HubError::network_error(format!("failed to connect to {}: {}", addr, e)))?;

    stream.write_all(line.as_bytes()).await?;

    let mut buf = [0u8; 1024];
    match timeout(wait, stream.read(&mut buf)).await {
        Ok(Ok(0)) => Ok(None),
        Ok(Ok(n)) => Ok(Some(String::from_utf8_lossy(&buf[..n]).into_owned())),
        Ok(Err(e)) => {
            debug!("No acknowledgement from {}: {}", addr, e);
            Ok(None)
        }
        Err(_) => Ok(None),
    }
}
