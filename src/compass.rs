//! Magnetic-mode heading extraction: low-pass pre-filtering and the
//! tilt-compensated accelerometer/magnetometer transform

use nalgebra::Vector3;

use crate::angle::{RAD_TO_DEG, normalize_360};

/// Exponential low-pass filter over a three-axis sensor vector
///
/// Smooths raw accelerometer and magnetometer streams before they are
/// combined into a heading. The first input passes through unfiltered and
/// seeds the state.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use qibla_compass::compass::LowPassVector;
///
/// let mut filter = LowPassVector::new(0.15);
/// let first = filter.filter(Vector3::new(0.0, 0.0, 9.81));
/// assert_eq!(first, Vector3::new(0.0, 0.0, 9.81));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LowPassVector {
    alpha: f32,
    state: Option<Vector3<f32>>,
}

impl LowPassVector {
    /// Create a filter with the given smoothing coefficient in (0, 1]
    ///
    /// Lower coefficients filter harder; 0.15 is the pipeline default.
    pub fn new(alpha: f32) -> Self {
        Self { alpha, state: None }
    }

    /// Fold in a new raw vector and return the smoothed value
    pub fn filter(&mut self, input: Vector3<f32>) -> Vector3<f32> {
        let output = match self.state {
            Some(previous) => previous + (input - previous) * self.alpha,
            None => input,
        };
        self.state = Some(output);
        output
    }

    /// Most recent smoothed value, if any input has been seen
    pub fn value(&self) -> Option<Vector3<f32>> {
        self.state
    }

    /// Discard the filter state
    pub fn reset(&mut self) {
        self.state = None;
    }
}

/// Tilt-compensated heading from smoothed accelerometer and magnetometer
/// vectors
///
/// Constructs orthogonal horizontal reference vectors with cross products
/// (the rotation-matrix-to-orientation transform reduced to the single
/// heading row) and recovers the azimuth with atan2. The device need not
/// be held level.
///
/// Returns `None` when the two vectors are degenerate (zero, or parallel,
/// as happens under strong magnetic interference aligned with gravity);
/// the caller keeps its previous heading in that case.
///
/// # Returns
/// Heading in degrees, [0, 360), 0° = magnetic north, clockwise-positive
pub fn heading_from_vectors(accelerometer: Vector3<f32>, magnetometer: Vector3<f32>) -> Option<f32> {
    // Horizontal west vector: accel × mag
    let west = safe_normalize(accelerometer.cross(&magnetometer))?;

    // Horizontal north vector: west × accel
    let north = safe_normalize(west.cross(&accelerometer))?;

    let heading_rad = west.x.atan2(north.x);
    Some(normalize_360(heading_rad * RAD_TO_DEG))
}

/// Normalize a vector, rejecting degenerate input
fn safe_normalize(vector: Vector3<f32>) -> Option<Vector3<f32>> {
    let magnitude_squared = vector.magnitude_squared();
    if magnitude_squared <= f32::EPSILON {
        return None;
    }
    Some(vector / magnitude_squared.sqrt())
}
