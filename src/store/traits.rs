//! Seams between the ingestion path and the store.

use crate::protocol::Reading;
use crate::store::StoreView;
use chrono::{DateTime, Utc};

/// Something that accepts classified readings.
///
/// Implementations must apply each reading atomically with respect to
/// concurrent callers.
pub trait ReadingSink: Send + Sync {
    /// Apply one reading received at `at`. Returns `true` if any state changed.
    fn apply(&self, reading: &Reading, at: DateTime<Utc>) -> bool;
}

/// Something that can hand out consistent snapshots.
pub trait SnapshotSource: Send + Sync {
    /// Take a snapshot that reflects every completed apply and no partial one.
    fn snapshot(&self) -> StoreView;
}
