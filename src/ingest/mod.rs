//! Sensor ingestion over TCP.
//!
//! Every sensor reading arrives on its own short-lived connection: the client
//! connects, writes one line, reads `OK`, and both sides close. There is no
//! framing and no persistent session.

pub mod client;
pub mod config;
pub mod connection;
pub mod listener;

// Re-export commonly used items
pub use client::send_reading;
pub use config::IngestConfig;
pub use connection::{handle_connection, ConnectionOutcome};
pub use listener::{serve, IngestServer};
