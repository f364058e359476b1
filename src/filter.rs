//! Scalar Kalman-style estimator specialized for circular headings

use crate::angle::normalize_360;
use crate::types::FilterSettings;

/// Initial error covariance before the first measurement
const INITIAL_ERROR_COVARIANCE: f32 = 1.0;

/// A recursive scalar estimator for a circular quantity
///
/// Maintains a heading estimate and its uncertainty, blending each new
/// measurement in proportion to the relative confidence. The innovation
/// is wrapped into (-180, 180] before the update; without that wrap the
/// filter diverges whenever the heading crosses the 0°/360° boundary.
///
/// # Example
/// ```
/// use qibla_compass::{FilterSettings, HeadingFilter};
///
/// let mut filter = HeadingFilter::new(FilterSettings::default());
/// let estimate = filter.update(90.0);
/// assert_eq!(estimate, 90.0); // first measurement initializes the filter
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HeadingFilter {
    settings: FilterSettings,
    estimate: f32,
    error_covariance: f32,
    initialized: bool,
}

impl HeadingFilter {
    /// Create a filter with the given tuning parameters
    pub fn new(settings: FilterSettings) -> Self {
        Self {
            settings,
            estimate: 0.0,
            error_covariance: INITIAL_ERROR_COVARIANCE,
            initialized: false,
        }
    }

    /// Fold a new heading measurement into the estimate
    ///
    /// The first measurement initializes the filter directly. Subsequent
    /// updates follow the standard predict/correct cycle with the
    /// innovation wrapped into (-180, 180]. Returns the new estimate,
    /// normalized to [0, 360).
    pub fn update(&mut self, measurement: f32) -> f32 {
        if !self.initialized {
            self.estimate = normalize_360(measurement);
            self.initialized = true;
            return self.estimate;
        }

        self.error_covariance += self.settings.process_noise;

        let mut innovation = measurement - self.estimate;
        if innovation > 180.0 {
            innovation -= 360.0;
        } else if innovation < -180.0 {
            innovation += 360.0;
        }

        let kalman_gain = self.error_covariance / (self.error_covariance + self.settings.measurement_noise);
        self.estimate = normalize_360(self.estimate + kalman_gain * innovation);
        self.error_covariance *= 1.0 - kalman_gain;

        self.estimate
    }

    /// Current heading estimate in [0, 360)
    pub fn estimate(&self) -> f32 {
        self.estimate
    }

    /// Current error covariance
    pub fn error_covariance(&self) -> f32 {
        self.error_covariance
    }

    /// Whether the filter has consumed at least one measurement
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Return the filter to its uninitialized starting state
    pub fn reset(&mut self) {
        self.estimate = 0.0;
        self.error_covariance = INITIAL_ERROR_COVARIANCE;
        self.initialized = false;
    }
}

impl Default for HeadingFilter {
    fn default() -> Self {
        Self::new(FilterSettings::default())
    }
}
