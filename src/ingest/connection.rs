//! Per-connection handling: one read, one reading, one acknowledgement.

use crate::error::{HubError, Result};
use crate::ingest::config::IngestConfig;
use crate::protocol::{classify, Reading, ACK};
use crate::store::ReadingSink;
use chrono::Utc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// What became of a single sensor connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionOutcome {
    /// The client closed without sending anything.
    Empty,
    /// A line was classified and handed to the store.
    Processed {
        reading: Reading,
        /// Whether the store changed (unrecognized lines leave it untouched)
        applied: bool,
        /// Whether the `OK` reached the client
        acknowledged: bool,
    },
}

/// Serve one sensor connection and close it.
///
/// The stream is shut down on every path, including errors. Errors are
/// scoped to this connection and never affect the accept loop.
pub async fn handle_connection<IO, S>(
    mut io: IO,
    sink: &S,
    config: &IngestConfig,
) -> Result<ConnectionOutcome>
where
    IO: AsyncRead + AsyncWrite + Unpin,
    S: ReadingSink + ?Sized,
{
    let outcome = process(&mut io, sink, config).await;
    if let Err(e) = io.shutdown().await {
        debug!("Error closing sensor connection: {}", e);
    }
    outcome
}

async fn process<IO, S>(io: &mut IO, sink: &S, config: &IngestConfig) -> Result<ConnectionOutcome>
where
    IO: AsyncRead + AsyncWrite + Unpin,
    S: ReadingSink + ?Sized,
{
    let mut buf = vec![0u8; config.read_buffer_bytes.max(1)];
    let read = timeout(config.read_timeout(), io.read(&mut buf))
        .await
        .map_err(|_| HubError::Timeout(config.read_timeout_ms))?;
    let n = read.map_err(|e| HubError::network_error(format!("read failed: {}", e)))?;

    if n == 0 {
        return Ok(ConnectionOutcome::Empty);
    }

    let text = std::str::from_utf8(&buf[..n])?;
    let reading = classify(text);
    let applied = sink.apply(&reading, Utc::now());

    if reading.is_recognized() {
        info!("Sensor reading: {}", text.trim());
    } else {
        debug!("Ignoring unrecognized line: {:?}", text.trim());
    }

    let acknowledged = match acknowledge(io).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to acknowledge sensor reading: {}", e);
            false
        }
    };

    Ok(ConnectionOutcome::Processed {
        reading,
        applied,
        acknowledged,
    })
}

async fn acknowledge<IO: AsyncWrite + Unpin>(io: &mut IO) -> std::io::Result<()> {
    io.write_all(ACK).await?;
    io.flush().await
}
