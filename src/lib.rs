//! # agri_hub - Smart Agriculture Sensor Hub
//!
//! Ingestion service for a Raspberry Pi based smart-farming deployment.
//! Sensor clients (water level, pest motion, temperature/humidity) each open
//! a TCP connection per reading, send one text line and wait for `OK`. The hub
//! classifies the line, folds it into a shared in-memory store with bounded
//! histories, and serves consistent snapshots to dashboards and the farming
//! assistant.
//!
//! ## Features
//!
//! - **Line protocol codec**: pure classification of raw sensor lines
//! - **Metric store**: one mutex guarding atomic applies and snapshot copies
//! - **Sensor listener**: one task per connection, graceful shutdown
//! - **Read API**: JSON snapshots, dashboard series and prompts over HTTP/WebSocket
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use agri_hub::{IngestConfig, IngestServer, MetricStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MetricStore::new());
//!     let server = IngestServer::bind(IngestConfig::default(), Arc::clone(&store)).await?;
//!
//!     // Accept sensor readings on port 6000 until Ctrl-C
//!     server.run_until(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//!     println!("pests seen: {}", store.snapshot().pest_count);
//!     Ok(())
//! }
//! ```

pub mod consumers;
pub mod error;
pub mod ingest;
pub mod protocol;
pub mod store;
pub mod web;

// Re-export public API
pub use consumers::{build_prompt, snapshot_stream, DashboardSeries, PromptContext};
pub use error::{HubError, Result};
pub use ingest::{handle_connection, send_reading, ConnectionOutcome, IngestConfig, IngestServer};
pub use protocol::{classify, Reading, WaterChange, WaterLevel};
pub use store::{MetricStore, ReadingSink, SnapshotSource, StoreView};
pub use web::{start_web_server, WebConfig};

/// The default TCP port sensor clients connect to
pub const DEFAULT_SENSOR_PORT: u16 = 6000;

/// The default web API port
pub const DEFAULT_WEB_PORT: u16 = 8080;

/// The default maximum length of every metric history
pub const DEFAULT_HISTORY_CAPACITY: usize = 300;

/// The default dashboard refresh interval in milliseconds
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 1000;
