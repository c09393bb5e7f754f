//! Read-side consumers of the metric store.
//!
//! Both the dashboard and the assistant only ever see [`StoreView`]
//! snapshots; neither holds the store's lock while it works.
//!
//! [`StoreView`]: crate::store::StoreView

pub mod dashboard;
pub mod feed;
pub mod prompt;

pub use dashboard::{DashboardLabels, DashboardSeries};
pub use feed::snapshot_stream;
pub use prompt::{build_prompt, PromptContext};

/// Timestamp layout used when rendering history entries as text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
