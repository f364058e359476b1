//! Core types and settings for the Qibla compass heading pipeline

use nalgebra::Vector3;

use crate::angle::normalize_360;

/// Heading filter tuning parameters
///
/// Controls the circular Kalman-style estimator. The defaults are the
/// values the quality thresholds were calibrated against; change them
/// only together.
///
/// # Example
/// ```
/// use qibla_compass::FilterSettings;
///
/// let settings = FilterSettings {
///     process_noise: 0.02, // more responsive, more jitter
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FilterSettings {
    /// Process noise added to the error covariance each update
    pub process_noise: f32,
    /// Measurement noise used in the Kalman gain denominator
    pub measurement_noise: f32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            process_noise: 0.008,
            measurement_noise: 0.1,
        }
    }
}

/// Pipeline tuning parameters
///
/// All timing gates use the host-supplied monotonic clock, expressed in
/// milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    /// Minimum interval between accepted raw samples (rate limiting)
    pub update_interval_ms: u64,
    /// Minimum interval between animated display updates
    pub animation_cooldown_ms: u64,
    /// Minimum heading change that triggers an animated update, in degrees
    ///
    /// Smaller changes still refresh textual state but do not animate,
    /// preventing jitter-driven animation thrash.
    pub min_visual_change: f32,
    /// Half-width of the "aligned with the Qibla" window, in degrees
    pub alignment_tolerance: f32,
    /// Interval between signal-quality evaluations
    pub quality_check_interval_ms: u64,
    /// Window after suspension within which the stored heading is reused
    pub resume_window_ms: u64,
    /// Low-pass coefficient for accelerometer/magnetometer pre-filtering
    pub low_pass_alpha: f32,
    /// Magnetic declination at the user's location, in degrees
    ///
    /// Added to magnetic-mode headings to correct magnetic north to true
    /// north. Supplied by the host; 0 when unknown.
    pub declination: f32,
    /// Heading filter parameters
    pub filter: FilterSettings,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            update_interval_ms: 200,
            animation_cooldown_ms: 600,
            min_visual_change: 3.0,
            alignment_tolerance: 8.0,
            quality_check_interval_ms: 3000,
            resume_window_ms: 30_000,
            low_pass_alpha: 0.15,
            declination: 0.0,
            filter: FilterSettings::default(),
        }
    }
}

/// Which orientation sensors the host platform can deliver
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorSuite {
    /// A composite rotation-vector sensor yielding a heading directly
    pub rotation_vector: bool,
    /// A raw three-axis accelerometer
    pub accelerometer: bool,
    /// A raw three-axis magnetometer
    pub magnetometer: bool,
}

/// Input mode of the heading pipeline
///
/// Selected once at construction from the available sensors and never
/// changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Composite rotation-vector sensor yields the heading directly
    Rotation,
    /// Accelerometer + magnetometer, low-pass filtered and combined
    Magnetic,
    /// No usable sensor: fixed display of bearing and distance only
    Static,
}

impl InputMode {
    /// Pick the best available mode for a sensor suite
    ///
    /// Prefers the rotation-vector sensor, falls back to the
    /// accelerometer/magnetometer pair, and degrades to [`InputMode::Static`]
    /// when neither is present.
    pub fn select(suite: SensorSuite) -> InputMode {
        if suite.rotation_vector {
            InputMode::Rotation
        } else if suite.accelerometer && suite.magnetometer {
            InputMode::Magnetic
        } else {
            InputMode::Static
        }
    }
}

/// A raw orientation sample delivered by the host sensor layer
#[derive(Debug, Clone, Copy)]
pub enum SensorSample {
    /// Heading derived from a rotation-vector sensor, in degrees
    RotationVector { heading: f32 },
    /// Raw accelerometer reading (gravity vector, any consistent unit)
    Accelerometer(Vector3<f32>),
    /// Raw magnetometer reading, in µT
    Magnetometer(Vector3<f32>),
}

/// Relationship between the current heading and the Qibla bearing
///
/// Recomputed on every accepted heading update.
#[derive(Debug, Clone, Copy)]
pub struct AlignmentState {
    /// Great-circle bearing to the target, degrees in [0, 360)
    pub bearing_to_target: f32,
    /// Current filtered heading, degrees in [0, 360)
    pub current_heading: f32,
    /// `bearing_to_target - current_heading`, wrapped into (-180, 180]
    pub signed_angle_difference: f32,
    /// Whether the heading is within the alignment tolerance
    pub is_aligned: bool,
}

/// Display decision for an accepted heading update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayEvent {
    /// Animate the compass rose from the previous heading to the new one
    Animated { from: f32, to: f32 },
    /// Refresh textual fields only; the change is too small to animate
    TextOnly,
}

/// Eight-way cardinal direction bucket for a heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardinalDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CardinalDirection {
    /// Bucket a heading into one of eight 45° sectors
    ///
    /// # Example
    /// ```
    /// use qibla_compass::CardinalDirection;
    ///
    /// assert_eq!(CardinalDirection::from_degrees(350.0), CardinalDirection::North);
    /// assert_eq!(CardinalDirection::from_degrees(135.0), CardinalDirection::SouthEast);
    /// ```
    pub fn from_degrees(degrees: f32) -> Self {
        const DIRECTIONS: [CardinalDirection; 8] = [
            CardinalDirection::North,
            CardinalDirection::NorthEast,
            CardinalDirection::East,
            CardinalDirection::SouthEast,
            CardinalDirection::South,
            CardinalDirection::SouthWest,
            CardinalDirection::West,
            CardinalDirection::NorthWest,
        ];
        let index = ((normalize_360(degrees) / 45.0).round() as usize) % 8;
        DIRECTIONS[index]
    }

    /// Compass abbreviation, e.g. `"NE"`
    pub fn abbreviation(&self) -> &'static str {
        match self {
            CardinalDirection::North => "N",
            CardinalDirection::NorthEast => "NE",
            CardinalDirection::East => "E",
            CardinalDirection::SouthEast => "SE",
            CardinalDirection::South => "S",
            CardinalDirection::SouthWest => "SW",
            CardinalDirection::West => "W",
            CardinalDirection::NorthWest => "NW",
        }
    }
}

/// Which way to turn to face the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnSide {
    Left,
    Right,
}

/// Coarse turn guidance derived from the signed alignment difference
///
/// Mirrors the guidance ladder shown to the user: slight adjustment,
/// a measured turn, a hard turn, or "the target is behind you".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TurnInstruction {
    /// Within 15°: nudge slightly toward the given side
    VeryClose(TurnSide),
    /// Within 45°: turn by roughly the given number of degrees
    Turn(TurnSide, f32),
    /// Within 90°: turn hard toward the given side
    TurnHard(TurnSide),
    /// More than 90° off: roughly a half turn
    TurnAround,
}

impl TurnInstruction {
    /// Derive guidance from a signed angle difference in (-180, 180]
    ///
    /// Positive differences mean the target lies clockwise (to the right).
    pub fn from_difference(signed_difference: f32) -> Self {
        let side = if signed_difference > 0.0 {
            TurnSide::Right
        } else {
            TurnSide::Left
        };
        let magnitude = signed_difference.abs();

        if magnitude <= 15.0 {
            TurnInstruction::VeryClose(side)
        } else if magnitude <= 45.0 {
            TurnInstruction::Turn(side, magnitude)
        } else if magnitude <= 90.0 {
            TurnInstruction::TurnHard(side)
        } else {
            TurnInstruction::TurnAround
        }
    }
}
