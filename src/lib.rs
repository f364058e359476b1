//! Qibla compass heading-estimation core
//!
//! This library turns noisy, high-rate raw orientation samples from
//! heterogeneous sensor sources into a stable, smoothly animated compass
//! heading, combined with the great-circle bearing and distance to the
//! Kaaba and a user-facing calibration procedure.
//!
//! # Features
//!
//! - Weighted circular-mean smoothing over a bounded reading buffer
//! - A Kalman-style estimator specialized for circular quantities,
//!   correct across the 0°/360° boundary
//! - Signal-quality monitoring with debounced interference warnings
//! - User calibration capture with a persisted correction offset
//! - Two interchangeable sensor input modes (rotation vector, or
//!   accelerometer + magnetometer with low-pass pre-filtering) and a
//!   static fallback when neither is available
//!
//! # Quick Start
//!
//! ```rust
//! use qibla_compass::{
//!     Coordinate, HeadingPipeline, MemoryStore, SensorSample, SensorSuite,
//! };
//!
//! let origin = Coordinate::new(30.0444, 31.2357).unwrap(); // Cairo
//! let suite = SensorSuite { rotation_vector: true, ..Default::default() };
//! let mut pipeline = HeadingPipeline::new(origin, suite, MemoryStore::new());
//!
//! // Feed samples from the host sensor layer (monotonic milliseconds)
//! for (heading, now_ms) in [(10.0, 0), (12.0, 200), (11.0, 400), (9.0, 600)] {
//!     if let Some(update) = pipeline.process(SensorSample::RotationVector { heading }, now_ms) {
//!         println!(
//!             "heading {:.1}°, Qibla at {:.1}°, aligned: {}",
//!             update.heading, update.alignment.bearing_to_target, update.alignment.is_aligned,
//!         );
//!     }
//! }
//! ```
//!
//! The pipeline performs no I/O and reads no clocks of its own: the host
//! supplies monotonic timestamps and a [`CompassStore`] implementation
//! for the calibration offset and last-known heading.

pub mod angle;
pub mod buffer;
pub mod calibration;
pub mod compass;
mod error;
pub mod filter;
pub mod geo;
mod pipeline;
pub mod quality;
mod store;
mod types;

// Re-export the primary API surface
pub use buffer::{Reading, ReadingBuffer};
pub use calibration::{CalibrationSession, CalibrationState};
pub use compass::{LowPassVector, heading_from_vectors};
pub use error::CompassError;
pub use filter::HeadingFilter;
pub use geo::{Coordinate, KAABA, bearing, distance_km};
pub use pipeline::{HeadingPipeline, PipelineUpdate};
pub use quality::{AccuracyClass, QualityLevel, QualityWarning, SignalQualityMonitor};
pub use store::{CompassStore, MemoryStore};
pub use types::{
    AlignmentState, CardinalDirection, DisplayEvent, FilterSettings, InputMode, PipelineSettings,
    SensorSample, SensorSuite, TurnInstruction, TurnSide,
};
