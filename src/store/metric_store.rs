//! The single shared, mutex-guarded metric store.

use super::history::{CappedHistory, ClimateSample};
use super::traits::{ReadingSink, SnapshotSource};
use super::view::StoreView;
use crate::protocol::reading::{pest_state, NO_PESTS_DETECTED};
use crate::protocol::{Reading, WaterLevel};
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Placeholder shown for a metric that has not reported yet.
pub const NOT_AVAILABLE: &str = "N/A";

/// Current values and bounded histories for every metric class.
///
/// The fields are reachable only through [`MetricStore::apply`] and
/// [`MetricStore::snapshot`], both of which hold the same lock for their
/// whole duration.
#[derive(Debug)]
pub struct MetricStore {
    state: Mutex<StoreState>,
    capacity: usize,
}

#[derive(Debug)]
struct StoreState {
    current_water: String,
    water_history: CappedHistory<String>,
    current_pest_state: String,
    pest_count: u64,
    pest_history: CappedHistory<String>,
    pest_total_history: CappedHistory<u64>,
    current_temp: String,
    current_hum: String,
    climate_history: CappedHistory<ClimateSample>,
}

impl StoreState {
    fn new(capacity: usize) -> Self {
        Self {
            current_water: NOT_AVAILABLE.to_string(),
            water_history: CappedHistory::new(capacity),
            current_pest_state: NO_PESTS_DETECTED.to_string(),
            pest_count: 0,
            pest_history: CappedHistory::new(capacity),
            pest_total_history: CappedHistory::new(capacity),
            current_temp: NOT_AVAILABLE.to_string(),
            current_hum: NOT_AVAILABLE.to_string(),
            climate_history: CappedHistory::new(capacity),
        }
    }

    fn record_water(&mut self, level: &WaterLevel, at: DateTime<Utc>) {
        let line = level.to_string();
        self.current_water = line.clone();
        self.water_history.push(at, line);
    }

    fn record_pest_event(&mut self, occurred: bool, at: DateTime<Utc>) {
        if occurred {
            self.pest_count = self.pest_count.saturating_add(1);
        }
        let state = pest_state(occurred).to_string();
        self.current_pest_state = state.clone();
        self.pest_history.push(at, state);
    }

    fn record_pest_total(&mut self, total: u64, at: DateTime<Utc>) {
        if total < self.pest_count {
            debug!(
                "Pest total {} overrides higher local count {}",
                total, self.pest_count
            );
        }
        self.pest_count = total;
        self.pest_total_history.push(at, total);
    }

    fn record_climate(&mut self, temperature_c: f64, humidity_pct: f64, at: DateTime<Utc>) {
        self.current_temp = format!("{:.1} °C", temperature_c);
        self.current_hum = format!("{:.1} %", humidity_pct);
        self.climate_history.push(
            at,
            ClimateSample {
                temperature_c,
                humidity_pct,
            },
        );
    }

    fn view(&self) -> StoreView {
        StoreView {
            current_water: self.current_water.clone(),
            water_history: self.water_history.to_vec(),
            current_pest_state: self.current_pest_state.clone(),
            pest_count: self.pest_count,
            pest_history: self.pest_history.to_vec(),
            pest_total_history: self.pest_total_history.to_vec(),
            current_temp: self.current_temp.clone(),
            current_hum: self.current_hum.clone(),
            climate_history: self.climate_history.to_vec(),
        }
    }
}

impl MetricStore {
    /// Create a store with the default history capacity.
    pub fn new() -> Self {
        Self::with_capacity(crate::DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a store whose histories each keep at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        let state = StoreState::new(capacity);
        let capacity = state.water_history.capacity();
        Self {
            state: Mutex::new(state),
            capacity,
        }
    }

    /// Maximum length of every history sequence.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Apply one reading atomically. Unrecognized readings change nothing.
    ///
    /// Returns `true` when the store was mutated.
    pub fn apply(&self, reading: &Reading, at: DateTime<Utc>) -> bool {
        let mut state = self.lock();
        match reading {
            Reading::WaterLevel(level) => state.record_water(level, at),
            Reading::PestEvent { occurred } => state.record_pest_event(*occurred, at),
            Reading::PestTotal { total } => state.record_pest_total(*total, at),
            Reading::Climate {
                temperature_c,
                humidity_pct,
            } => state.record_climate(*temperature_c, *humidity_pct, at),
            Reading::Unrecognized { .. } => return false,
        }
        true
    }

    /// Copy every field out under the lock.
    pub fn snapshot(&self) -> StoreView {
        self.lock().view()
    }

    // Every apply finishes its mutation before anything that could panic,
    // so a poisoned lock still guards a consistent state.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingSink for MetricStore {
    fn apply(&self, reading: &Reading, at: DateTime<Utc>) -> bool {
        MetricStore::apply(self, reading, at)
    }
}

impl SnapshotSource for MetricStore {
    fn snapshot(&self) -> StoreView {
        MetricStore::snapshot(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::classify;

    fn apply_line(store: &MetricStore, line: &str) -> bool {
        store.apply(&classify(line), Utc::now())
    }

    #[test]
    fn test_initial_state() {
        let view = MetricStore::new().snapshot();
        assert_eq!(view.current_water, "N/A");
        assert_eq!(view.current_pest_state, "No Pests Detected");
        assert_eq!(view.pest_count, 0);
        assert_eq!(view.current_temp, "N/A");
        assert_eq!(view.current_hum, "N/A");
        assert!(view.water_history.is_empty());
        assert!(view.climate_history.is_empty());
    }

    #[test]
    fn test_water_reading_updates_current_and_history() {
        let store = MetricStore::new();
        assert!(apply_line(&store, "Water level: 5.40 cm. (Initial reading)"));
        assert!(apply_line(&store, "Water level: 6.10 cm. Water added: 0.70 cm."));

        let view = store.snapshot();
        assert_eq!(view.current_water, "Water level: 6.10 cm. Water added: 0.70 cm.");
        assert_eq!(view.water_history.len(), 2);
        assert_eq!(
            view.water_history[0].value,
            "Water level: 5.40 cm. (Initial reading)"
        );
    }

    #[test]
    fn test_pest_events_count_only_detections() {
        let store = MetricStore::new();
        apply_line(&store, "Pest Detected");
        apply_line(&store, "No Pests Detected");
        apply_line(&store, "Pest Detected");

        let view = store.snapshot();
        assert_eq!(view.pest_count, 2);
        assert_eq!(view.pest_history.len(), 3);
        assert_eq!(view.current_pest_state, "Pest Detected");
    }

    #[test]
    fn test_pest_total_overrides_count_even_downwards() {
        let store = MetricStore::new();
        for _ in 0..5 {
            apply_line(&store, "Pest Detected");
        }
        apply_line(&store, "Total Pests Detected: 2");

        let view = store.snapshot();
        assert_eq!(view.pest_count, 2);
        assert_eq!(view.pest_total_history.len(), 1);
        assert_eq!(view.pest_total_history[0].value, 2);
    }

    #[test]
    fn test_climate_formatting() {
        let store = MetricStore::new();
        apply_line(&store, "Temperature: 19.96 °C (Δ —)   Humidity: 40.04% (Δ —)");

        let view = store.snapshot();
        assert_eq!(view.current_temp, "20.0 °C");
        assert_eq!(view.current_hum, "40.0 %");
        assert_eq!(view.climate_history[0].value.temperature_c, 19.96);
    }

    #[test]
    fn test_unrecognized_leaves_store_untouched() {
        let store = MetricStore::new();
        apply_line(&store, "Pest Detected");
        apply_line(&store, "Temperature: 23.5 °C (Δ —)   Humidity: 55.0% (Δ —)");
        let before = store.snapshot();

        assert!(!apply_line(&store, "Client 1 disconnected"));
        assert!(!apply_line(&store, "Total Pests Detected: lots"));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_histories_are_capped() {
        let store = MetricStore::with_capacity(4);
        for i in 0..10 {
            apply_line(&store, &format!("Total Pests Detected: {}", i));
        }

        let view = store.snapshot();
        let totals: Vec<u64> = view.pest_total_history.iter().map(|e| e.value).collect();
        assert_eq!(totals, vec![6, 7, 8, 9]);
        assert_eq!(store.capacity(), 4);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = MetricStore::new();
        let view = store.snapshot();
        apply_line(&store, "Pest Detected");
        assert_eq!(view.pest_count, 0);
        assert_eq!(store.snapshot().pest_count, 1);
    }
}
