//! Bounded, time-ordered history buffers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A value together with the time the hub received it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamped<T> {
    pub at: DateTime<Utc>,
    pub value: T,
}

/// One temperature/humidity pair in the climate history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateSample {
    pub temperature_c: f64,
    pub humidity_pct: f64,
}

/// Append-only history holding at most `capacity` entries.
///
/// Pushing past the capacity evicts the oldest entry, so the buffer always
/// holds the most recent entries in arrival order.
#[derive(Debug, Clone)]
pub struct CappedHistory<T> {
    entries: VecDeque<Stamped<T>>,
    capacity: usize,
}

impl<T: Clone> CappedHistory<T> {
    /// Create an empty history. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, returning the evicted one if the buffer was full.
    pub fn push(&mut self, at: DateTime<Utc>, value: T) -> Option<Stamped<T>> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(Stamped { at, value });
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&Stamped<T>> {
        self.entries.back()
    }

    /// Iterate oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Stamped<T>> {
        self.entries.iter()
    }

    /// Copy the entries out, oldest first.
    pub fn to_vec(&self) -> Vec<Stamped<T>> {
        self.entries.iter().cloned().collect()
    }
}
