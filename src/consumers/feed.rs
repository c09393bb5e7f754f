//! Periodic snapshot stream, the dashboard's refresh timer.

use crate::store::{SnapshotSource, StoreView};
use futures_util::stream::{self, BoxStream};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

/// Yield a fresh snapshot of `source` every `interval_ms` milliseconds.
///
/// The first snapshot is produced immediately. The stream never ends on its
/// own; drop it to stop polling the store.
pub fn snapshot_stream<S>(source: Arc<S>, interval_ms: u64) -> BoxStream<'static, StoreView>
where
    S: SnapshotSource + ?Sized + 'static,
{
    let mut interval = time::interval(Duration::from_millis(interval_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let stream = stream::unfold((source, interval), |(source, mut interval)| async move {
        interval.tick().await;
        let view = source.snapshot();
        Some((view, (source, interval)))
    });

    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::classify;
    use crate::store::MetricStore;
    use chrono::Utc;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_stream_reflects_new_readings() {
        let store = Arc::new(MetricStore::new());
        let mut feed = snapshot_stream(Arc::clone(&store), 10);

        let first = feed.next().await.expect("feed yields immediately");
        assert_eq!(first.pest_count, 0);

        store.apply(&classify("Pest Detected"), Utc::now());
        let second = feed.next().await.expect("feed keeps yielding");
        assert_eq!(second.pest_count, 1);
    }
}
