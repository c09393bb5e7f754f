//! Immutable snapshot of the metric store.

use super::history::{ClimateSample, Stamped};
use crate::protocol::{classify, Reading};
use serde::{Deserialize, Serialize};

/// Value copy of every field in the [`MetricStore`](super::MetricStore).
///
/// All history sequences are oldest first. A view is never updated after it
/// is taken; take another snapshot to see newer readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreView {
    /// Latest water level line, or `N/A` before the first reading
    pub current_water: String,
    pub water_history: Vec<Stamped<String>>,
    /// `Pest Detected` or `No Pests Detected`
    pub current_pest_state: String,
    pub pest_count: u64,
    pub pest_history: Vec<Stamped<String>>,
    pub pest_total_history: Vec<Stamped<u64>>,
    /// Formatted like `23.5 °C`
    pub current_temp: String,
    /// Formatted like `55.0 %`
    pub current_hum: String,
    pub climate_history: Vec<Stamped<ClimateSample>>,
}

impl StoreView {
    /// Level in centimetres from the newest water history line.
    pub fn latest_water_cm(&self) -> Option<f64> {
        let entry = self.water_history.last()?;
        match classify(&entry.value) {
            Reading::WaterLevel(level) => Some(level.level_cm),
            _ => None,
        }
    }

    pub fn latest_pest_total(&self) -> Option<u64> {
        self.pest_total_history.last().map(|entry| entry.value)
    }

    pub fn latest_climate(&self) -> Option<ClimateSample> {
        self.climate_history.last().map(|entry| entry.value)
    }
}
