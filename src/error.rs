//! Error taxonomy for the Qibla compass core

use thiserror::Error;

/// Errors produced by the heading-estimation core.
///
/// The filtering core favors graceful degradation over aborting: numeric
/// edge cases (empty buffer, zero total weight) have defined fallback
/// values and never surface here. These variants cover the cases a caller
/// genuinely has to react to.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompassError {
    /// Latitude or longitude outside its valid range.
    ///
    /// Raised on construction of a [`crate::geo::Coordinate`]; out-of-range
    /// inputs fail fast and are never silently clamped.
    #[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Calibration finished with too few captured samples.
    ///
    /// The session returns to idle with the stored offset unchanged.
    #[error("insufficient calibration data: captured {captured} samples, need {required}")]
    InsufficientCalibrationData { captured: usize, required: usize },

    /// No usable orientation sensor was available.
    ///
    /// The pipeline falls back to static mode rather than failing, but
    /// reports the condition so the host can inform the user.
    #[error("no orientation sensor available, falling back to static display")]
    SensorUnavailable,

    /// The persistent store could not be read or written.
    ///
    /// Non-fatal: the pipeline proceeds with default values.
    #[error("persistent store failure: {0}")]
    Store(String),
}
