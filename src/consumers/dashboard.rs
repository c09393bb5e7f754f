//! Rolling plot buffers backing the dashboard.
//!
//! Each refresh appends the newest value of every metric to its series, the
//! way the dashboard's charts scroll: one point per tick, whether or not a new
//! reading arrived since the previous tick.

use crate::store::StoreView;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Spacing of the water level chart's y-axis ticks, in centimetres.
pub const WATER_TICK_STEP_CM: f64 = 0.3;

/// Text shown under the charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardLabels {
    pub pests: String,
    pub temperature: String,
    pub humidity: String,
}

/// Four capped series plus the current-value labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSeries {
    pub water_cm: VecDeque<f64>,
    pub pest_totals: VecDeque<u64>,
    pub temperature_c: VecDeque<f64>,
    pub humidity_pct: VecDeque<f64>,
    pub labels: DashboardLabels,
    capacity: usize,
}

impl DashboardSeries {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            water_cm: VecDeque::with_capacity(capacity),
            pest_totals: VecDeque::with_capacity(capacity),
            temperature_c: VecDeque::with_capacity(capacity),
            humidity_pct: VecDeque::with_capacity(capacity),
            labels: DashboardLabels::default(),
            capacity,
        }
    }

    /// Append the latest values from `view` and update the labels.
    pub fn refresh(&mut self, view: &StoreView) {
        let capacity = self.capacity;

        if let Some(level) = view.latest_water_cm() {
            push_capped(&mut self.water_cm, level, capacity);
        }
        if let Some(total) = view.latest_pest_total() {
            push_capped(&mut self.pest_totals, total, capacity);
        }
        if let Some(sample) = view.latest_climate() {
            push_capped(&mut self.temperature_c, sample.temperature_c, capacity);
            push_capped(&mut self.humidity_pct, sample.humidity_pct, capacity);
        }

        self.labels = DashboardLabels {
            pests: format!("Total pests: {}", view.pest_count),
            temperature: format!("Temperature now: {}", view.current_temp),
            humidity: format!("Humidity now: {}", view.current_hum),
        };
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Y-axis ticks covering the water series, rounded outward to
    /// [`WATER_TICK_STEP_CM`]. Empty until the first water reading.
    pub fn water_ticks(&self) -> Vec<f64> {
        let (lo, hi) = match min_max(&self.water_cm) {
            Some(bounds) => bounds,
            None => return Vec::new(),
        };

        let first = (lo / WATER_TICK_STEP_CM).floor() as i64;
        let last = (hi / WATER_TICK_STEP_CM).ceil() as i64;
        (first..=last)
            .map(|step| step as f64 * WATER_TICK_STEP_CM)
            .collect()
    }
}

impl Default for DashboardSeries {
    fn default() -> Self {
        Self::new(crate::DEFAULT_HISTORY_CAPACITY)
    }
}

fn push_capped<T>(series: &mut VecDeque<T>, value: T, capacity: usize) {
    if series.len() == capacity {
        series.pop_front();
    }
    series.push_back(value);
}

fn min_max(values: &VecDeque<f64>) -> Option<(f64, f64)> {
    let mut iter = values.iter().copied();
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}
