//! Bounded, time-ordered buffer of weighted compass readings

use std::collections::VecDeque;

use crate::angle::circular_mean;

/// Buffer algorithm constants
const CAPACITY: usize = 15;
const MIN_SAMPLES_FOR_MEAN: usize = 3;
const MIN_WEIGHT: f32 = 0.1;
const AGE_WINDOW_MS: f32 = 5000.0;

/// A single timestamped compass reading
///
/// Owned exclusively by the [`ReadingBuffer`]; created on each accepted
/// sensor sample and destroyed by FIFO eviction.
#[derive(Debug, Clone, Copy)]
pub struct Reading {
    /// Heading in degrees, [0, 360)
    pub angle: f32,
    /// Monotonic timestamp in milliseconds
    pub timestamp_ms: u64,
    /// Sensor-accuracy weight in [0.1, 1.0]
    pub accuracy_weight: f32,
}

/// Bounded FIFO of recent readings with a recency-and-accuracy weighted
/// circular mean
///
/// Holds at most 15 readings; adding to a full buffer evicts the oldest
/// entry. The weighted mean refuses to answer until three readings have
/// accumulated, so the pipeline never emits a filtered update off a
/// near-empty buffer.
#[derive(Debug, Clone, Default)]
pub struct ReadingBuffer {
    readings: VecDeque<Reading>,
}

impl ReadingBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self {
            readings: VecDeque::with_capacity(CAPACITY),
        }
    }

    /// Append a reading, evicting the oldest entry when over capacity
    ///
    /// The accuracy weight is clamped to a minimum of 0.1 so that a
    /// zero-weight sample cannot degenerate the mean.
    pub fn add(&mut self, angle: f32, timestamp_ms: u64, accuracy_weight: f32) {
        self.readings.push_back(Reading {
            angle,
            timestamp_ms,
            accuracy_weight: accuracy_weight.max(MIN_WEIGHT),
        });
        if self.readings.len() > CAPACITY {
            self.readings.pop_front();
        }
    }

    /// Weighted circular mean of the buffered readings
    ///
    /// Each reading is weighted by `max(0.1, 1 - age/5s) * accuracy_weight`,
    /// so newer and more accurate readings dominate. Returns `None` while
    /// fewer than three readings are buffered.
    pub fn weighted_mean(&self, now_ms: u64) -> Option<f32> {
        if self.readings.len() < MIN_SAMPLES_FOR_MEAN {
            return None;
        }

        let weighted: Vec<(f32, f32)> = self
            .readings
            .iter()
            .map(|reading| {
                let age_ms = now_ms.saturating_sub(reading.timestamp_ms) as f32;
                let age_weight = (1.0 - age_ms / AGE_WINDOW_MS).max(MIN_WEIGHT);
                (reading.angle, age_weight * reading.accuracy_weight)
            })
            .collect();

        circular_mean(&weighted)
    }

    /// Raw angles of the buffered readings, oldest first
    pub fn angles(&self) -> impl Iterator<Item = f32> + '_ {
        self.readings.iter().map(|reading| reading.angle)
    }

    /// Number of buffered readings
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the buffer holds no readings
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Maximum number of readings the buffer will hold
    pub fn capacity(&self) -> usize {
        CAPACITY
    }

    /// Discard all buffered readings
    pub fn clear(&mut self) {
        self.readings.clear();
    }
}
