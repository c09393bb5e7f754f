//! Shared in-memory metric state.
//!
//! One [`MetricStore`] lives for the whole process. Connection handlers write
//! to it through [`MetricStore::apply`]; dashboards and prompt builders read
//! it through [`MetricStore::snapshot`].

pub mod history;
pub mod metric_store;
pub mod traits;
pub mod view;

// Re-export commonly used items
pub use history::{CappedHistory, ClimateSample, Stamped};
pub use metric_store::{MetricStore, NOT_AVAILABLE};
pub use traits::{ReadingSink, SnapshotSource};
pub use view::StoreView;
