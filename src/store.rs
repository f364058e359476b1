//! Persistent key-value store abstraction for calibration and heading state

use crate::error::CompassError;

/// Small persistent store consumed by the pipeline
///
/// The host supplies an implementation backed by whatever key-value
/// facility it has. Writes are fire-and-forget: failures are logged and
/// tolerated, never retried, and a missing value simply means the default
/// applies on next load.
pub trait CompassStore {
    /// Load the persisted calibration offset, if any
    fn load_calibration_offset(&self) -> Result<Option<f32>, CompassError>;

    /// Persist the calibration offset
    fn store_calibration_offset(&mut self, offset: f32) -> Result<(), CompassError>;

    /// Load the last known heading and the monotonic time it was stored
    fn load_last_heading(&self) -> Result<Option<(f32, u64)>, CompassError>;

    /// Persist the current heading with its timestamp
    fn store_last_heading(&mut self, heading: f32, timestamp_ms: u64) -> Result<(), CompassError>;
}

/// In-memory store for tests and demos
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    calibration_offset: Option<f32>,
    last_heading: Option<(f32, u64)>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a calibration offset
    pub fn with_calibration_offset(offset: f32) -> Self {
        Self {
            calibration_offset: Some(offset),
            last_heading: None,
        }
    }
}

impl CompassStore for MemoryStore {
    fn load_calibration_offset(&self) -> Result<Option<f32>, CompassError> {
        Ok(self.calibration_offset)
    }

    fn store_calibration_offset(&mut self, offset: f32) -> Result<(), CompassError> {
        self.calibration_offset = Some(offset);
        Ok(())
    }

    fn load_last_heading(&self) -> Result<Option<(f32, u64)>, CompassError> {
        Ok(self.last_heading)
    }

    fn store_last_heading(&mut self, heading: f32, timestamp_ms: u64) -> Result<(), CompassError> {
        self.last_heading = Some((heading, timestamp_ms));
        Ok(())
    }
}
