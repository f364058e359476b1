//! User calibration: bounded capture of headings producing a correction offset

use log::{debug, info};

use crate::angle::{circular_mean, normalize_360};
use crate::error::CompassError;

/// Calibration session constants
const CAPTURE_DURATION_MS: u64 = 15_000;
const MIN_SAMPLES: usize = 10;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalibrationState {
    /// Not capturing; the current offset stands
    #[default]
    Idle,
    /// Capturing headings until the duration cap
    Capturing,
}

/// A bounded-duration capture of headings that yields a correction offset
///
/// The user sweeps the device (the classic figure-eight motion) for up to
/// 15 seconds while the session records filtered headings. On completion
/// the circular mean of the captured headings is compared against
/// magnetic north and the negated mean becomes the new offset, applied
/// additively to every subsequent raw heading.
///
/// Capture only observes headings already computed for the main pipeline;
/// it never blocks sample processing.
///
/// # Example
/// ```
/// use qibla_compass::CalibrationSession;
///
/// let mut session = CalibrationSession::new();
/// session.start(0);
/// for i in 0..12 {
///     session.ingest(90.0);
///     assert!(session.tick(i * 1000).is_none()); // still capturing
/// }
/// let offset = session.tick(15_000).expect("duration cap reached").unwrap();
/// assert!((offset - 270.0).abs() < 0.1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CalibrationSession {
    state: CalibrationState,
    start_ms: u64,
    samples: Vec<f32>,
}

impl CalibrationSession {
    /// Create an idle session
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin capturing: clears previous samples and records the start time
    pub fn start(&mut self, now_ms: u64) {
        self.samples.clear();
        self.start_ms = now_ms;
        self.state = CalibrationState::Capturing;
        debug!("calibration capture started");
    }

    /// Record a heading sample; a no-op unless capturing
    pub fn ingest(&mut self, heading: f32) {
        if self.state == CalibrationState::Capturing {
            self.samples.push(heading);
        }
    }

    /// Advance the session clock, finishing once the duration cap elapses
    ///
    /// Returns `Some` exactly once per capture, carrying the outcome of
    /// [`CalibrationSession::finish`].
    pub fn tick(&mut self, now_ms: u64) -> Option<Result<f32, CompassError>> {
        if self.state != CalibrationState::Capturing {
            return None;
        }
        if now_ms.saturating_sub(self.start_ms) >= CAPTURE_DURATION_MS {
            return Some(self.finish());
        }
        None
    }

    /// Complete the capture and compute the offset
    ///
    /// Fails with [`CompassError::InsufficientCalibrationData`] when fewer
    /// than ten samples were captured; the previous offset then stands.
    /// Otherwise the offset is `normalize_360(0 − circular_mean(samples))`.
    /// The session returns to idle either way.
    pub fn finish(&mut self) -> Result<f32, CompassError> {
        self.state = CalibrationState::Idle;
        let captured = self.samples.len();

        if captured < MIN_SAMPLES {
            self.samples.clear();
            return Err(CompassError::InsufficientCalibrationData {
                captured,
                required: MIN_SAMPLES,
            });
        }

        let weighted: Vec<(f32, f32)> = self.samples.iter().map(|&angle| (angle, 1.0)).collect();
        self.samples.clear();

        // Equal-weight circular mean; non-empty by the count check above
        let mean = circular_mean(&weighted).unwrap_or(0.0);
        let offset = normalize_360(0.0 - mean);
        info!("calibration complete: {} samples, offset {:.1}°", captured, offset);
        Ok(offset)
    }

    /// Current session state
    pub fn state(&self) -> CalibrationState {
        self.state
    }

    /// Whether a capture is in progress
    pub fn is_capturing(&self) -> bool {
        self.state == CalibrationState::Capturing
    }

    /// Number of samples captured so far
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Fraction of the capture window elapsed, in [0, 1]
    ///
    /// Zero while idle; intended for a host progress indicator.
    pub fn progress(&self, now_ms: u64) -> f32 {
        if self.state != CalibrationState::Capturing {
            return 0.0;
        }
        let elapsed = now_ms.saturating_sub(self.start_ms) as f32;
        (elapsed / CAPTURE_DURATION_MS as f32).clamp(0.0, 1.0)
    }
}
