//! Circular (angular) arithmetic utilities for compass headings

/// Mathematical constants
pub const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Normalize an angle in degrees to the range [0, 360)
///
/// Works for arbitrarily large positive or negative inputs.
///
/// # Example
/// ```
/// use qibla_compass::angle::normalize_360;
///
/// assert_eq!(normalize_360(370.0), 10.0);
/// assert_eq!(normalize_360(-10.0), 350.0);
/// ```
pub fn normalize_360(angle: f32) -> f32 {
    let wrapped = angle % 360.0;
    if wrapped < 0.0 { wrapped + 360.0 } else { wrapped }
}

/// Minimal absolute circular difference between two headings
///
/// The result is always in [0, 180] and symmetric in its arguments.
///
/// # Example
/// ```
/// use qibla_compass::angle::angle_difference;
///
/// assert_eq!(angle_difference(350.0, 10.0), 20.0);
/// ```
pub fn angle_difference(a: f32, b: f32) -> f32 {
    let diff = (a - b).abs() % 360.0;
    diff.min(360.0 - diff)
}

/// Signed circular difference `a - b`, wrapped into (-180, 180]
///
/// Positive results mean `a` lies clockwise of `b`.
pub fn signed_difference(a: f32, b: f32) -> f32 {
    let mut diff = (a - b) % 360.0;
    if diff > 180.0 {
        diff -= 360.0;
    } else if diff <= -180.0 {
        diff += 360.0;
    }
    diff
}

/// Wraparound-aware linear interpolation between two headings
///
/// Interpolates along the shorter arc from `a` to `b`. `t` is clamped
/// to [0, 1]. The result is normalized to [0, 360).
///
/// # Example
/// ```
/// use qibla_compass::angle::lerp_wrapped;
///
/// // Halfway from 350° to 10° is 0°, not 180°
/// assert!((lerp_wrapped(350.0, 10.0, 0.5) - 0.0).abs() < 1e-3);
/// ```
pub fn lerp_wrapped(a: f32, b: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    normalize_360(a + signed_difference(b, a) * t)
}

/// Weighted circular mean of a set of headings
///
/// Each sample is treated as a unit vector scaled by its weight; the mean
/// direction is recovered with atan2. Returns `None` when the sample set
/// is empty or the total weight is not positive; callers are expected to
/// substitute their current heading, so this is a defined fallback rather
/// than an error.
///
/// # Example
/// ```
/// use qibla_compass::angle::circular_mean;
///
/// let mean = circular_mean(&[(350.0, 1.0), (10.0, 1.0)]).unwrap();
/// assert!(mean < 1.0 || mean > 359.0); // wraps to ~0°, not 180°
/// ```
pub fn circular_mean(samples: &[(f32, f32)]) -> Option<f32> {
    let mut sum_sin = 0.0f64;
    let mut sum_cos = 0.0f64;
    let mut total_weight = 0.0f64;

    for &(angle, weight) in samples {
        let rad = (angle * DEG_TO_RAD) as f64;
        let w = weight as f64;
        sum_sin += rad.sin() * w;
        sum_cos += rad.cos() * w;
        total_weight += w;
    }

    if total_weight <= 0.0 {
        return None;
    }

    let mean_rad = (sum_sin / total_weight).atan2(sum_cos / total_weight);
    Some(normalize_360(mean_rad as f32 * RAD_TO_DEG))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_range() {
        for a in [-720.0f32, -361.0, -180.0, -0.1, 0.0, 45.0, 359.9, 360.0, 725.0] {
            let n = normalize_360(a);
            assert!((0.0..360.0).contains(&n), "normalize_360({}) = {}", a, n);
        }
    }

    #[test]
    fn test_normalize_periodicity() {
        for a in [-90.0f32, 0.0, 13.7, 180.0, 271.4] {
            let d = (normalize_360(a) - normalize_360(a + 360.0)).abs();
            assert!(d < 1e-3, "normalize not periodic at {}: diff {}", a, d);
        }
    }

    #[test]
    fn test_angle_difference_symmetric_and_bounded() {
        let pairs = [(0.0f32, 0.0f32), (0.0, 180.0), (350.0, 10.0), (90.0, 270.0), (5.0, 355.0)];
        for (a, b) in pairs {
            let d1 = angle_difference(a, b);
            let d2 = angle_difference(b, a);
            assert!((d1 - d2).abs() < 1e-5, "asymmetric at ({}, {})", a, b);
            assert!((0.0..=180.0).contains(&d1), "out of range at ({}, {}): {}", a, b, d1);
        }
        assert_eq!(angle_difference(350.0, 10.0), 20.0);
    }

    #[test]
    fn test_signed_difference_wrap() {
        assert!((signed_difference(10.0, 350.0) - 20.0).abs() < 1e-5);
        assert!((signed_difference(350.0, 10.0) + 20.0).abs() < 1e-5);
        // Antipodal case lands on +180, not -180
        assert!((signed_difference(180.0, 0.0) - 180.0).abs() < 1e-5);
    }

    #[test]
    fn test_lerp_wrapped_shorter_arc() {
        let mid = lerp_wrapped(350.0, 10.0, 0.5);
        assert!(mid < 1.0 || mid > 359.0, "midpoint crossed the long way: {}", mid);
        assert!((lerp_wrapped(40.0, 60.0, 0.25) - 45.0).abs() < 1e-3);
        // Endpoints
        assert!((lerp_wrapped(350.0, 10.0, 0.0) - 350.0).abs() < 1e-3);
        assert!((lerp_wrapped(350.0, 10.0, 1.0) - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_circular_mean_wraparound() {
        let mean = circular_mean(&[(350.0, 1.0), (10.0, 1.0)]).unwrap();
        assert!(
            angle_difference(mean, 0.0) < 1.0,
            "mean of 350° and 10° should be ~0°, got {}",
            mean
        );
    }

    #[test]
    fn test_circular_mean_weighting() {
        // Heavier weight pulls the mean toward that sample
        let mean = circular_mean(&[(0.0, 3.0), (90.0, 1.0)]).unwrap();
        assert!(mean < 45.0, "weighted mean should favor 0°, got {}", mean);
    }

    #[test]
    fn test_circular_mean_degenerate_inputs() {
        assert!(circular_mean(&[]).is_none());
        assert!(circular_mean(&[(120.0, 0.0), (240.0, 0.0)]).is_none());
    }
}
