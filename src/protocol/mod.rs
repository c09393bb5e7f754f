//! Line protocol spoken by the sensor clients.
//!
//! Each TCP connection carries exactly one UTF-8 line, for example
//! `Water level: 5.40 cm. (Initial reading)` or `Total Pests Detected: 3`.
//! The server answers with [`ACK`] and closes.

pub mod codec;
pub mod reading;

pub use codec::classify;
pub use reading::{Reading, WaterChange, WaterLevel};

/// Acknowledgement written back to every client that sent a line.
pub const ACK: &[u8] = b"OK";
