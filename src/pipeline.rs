//! Heading pipeline: orchestrates ingestion, filtering, calibration, and
//! display decisions for the Qibla compass

use log::{debug, info, warn};

use crate::angle::{angle_difference, normalize_360, signed_difference};
use crate::buffer::ReadingBuffer;
use crate::calibration::CalibrationSession;
use crate::compass::{LowPassVector, heading_from_vectors};
use crate::error::CompassError;
use crate::filter::HeadingFilter;
use crate::geo::{self, Coordinate, KAABA};
use crate::quality::{AccuracyClass, QualityLevel, QualityWarning, SignalQualityMonitor};
use crate::store::CompassStore;
use crate::types::{
    AlignmentState, DisplayEvent, InputMode, PipelineSettings, SensorSample, SensorSuite,
};

/// Everything the display layer needs after one accepted heading update
#[derive(Debug, Clone, Copy)]
pub struct PipelineUpdate {
    /// Current filtered heading, degrees in [0, 360)
    pub heading: f32,
    /// Alignment against the Qibla bearing, recomputed for this update
    pub alignment: AlignmentState,
    /// Great-circle distance to the target, in kilometers
    pub distance_km: f64,
    /// Signal quality at the most recent evaluation
    pub quality: QualityLevel,
    /// Whether to animate the compass rose or just refresh text
    pub display: DisplayEvent,
    /// Debounced quality warning, if one became due
    pub warning: Option<QualityWarning>,
    /// True exactly when alignment transitions from false to true
    pub aligned_notification: bool,
}

/// The heading-estimation pipeline
///
/// Receives raw orientation samples from one of two interchangeable input
/// modes, rate-limits them, smooths them through the reading buffer and
/// the circular Kalman filter, applies the user's calibration offset, and
/// decides whether the display layer should animate. When no usable
/// sensor exists the pipeline degrades to a static bearing/distance
/// display instead of failing.
///
/// Processing is strictly single-consumer: each call to
/// [`HeadingPipeline::process`] runs to completion before the next sample
/// is accepted. All time arguments are milliseconds from the host's
/// monotonic clock.
pub struct HeadingPipeline<S: CompassStore> {
    settings: PipelineSettings,
    mode: InputMode,
    fallback_reason: Option<CompassError>,

    bearing_to_target: f32,
    distance_km: f64,

    store: S,
    calibration_offset: f32,
    calibration: CalibrationSession,

    buffer: ReadingBuffer,
    filter: HeadingFilter,
    quality: SignalQualityMonitor,

    gravity: LowPassVector,
    geomagnetic: LowPassVector,

    current_heading: f32,
    is_aligned: bool,
    last_quality: QualityLevel,

    last_accepted_ms: Option<u64>,
    last_animation_ms: Option<u64>,
    last_quality_check_ms: Option<u64>,
}

impl<S: CompassStore> HeadingPipeline<S> {
    /// Create a pipeline with default settings
    ///
    /// `origin` is the user's location, supplied once; the target is the
    /// Kaaba. The input mode is selected from `suite` and never changes.
    pub fn new(origin: Coordinate, suite: SensorSuite, store: S) -> Self {
        Self::with_settings(origin, suite, store, PipelineSettings::default())
    }

    /// Create a pipeline with explicit settings
    pub fn with_settings(
        origin: Coordinate,
        suite: SensorSuite,
        store: S,
        settings: PipelineSettings,
    ) -> Self {
        let mode = InputMode::select(suite);
        let fallback_reason = if mode == InputMode::Static {
            warn!("no orientation sensor available, static compass only");
            Some(CompassError::SensorUnavailable)
        } else {
            None
        };

        let calibration_offset = match store.load_calibration_offset() {
            Ok(Some(offset)) => {
                debug!("loaded calibration offset {:.1}°", offset);
                offset
            }
            Ok(None) => 0.0,
            Err(error) => {
                warn!("calibration offset unreadable, using 0: {}", error);
                0.0
            }
        };

        let alpha = settings.low_pass_alpha;
        Self {
            settings,
            mode,
            fallback_reason,
            bearing_to_target: geo::bearing(origin, KAABA) as f32,
            distance_km: geo::distance_km(origin, KAABA),
            store,
            calibration_offset,
            calibration: CalibrationSession::new(),
            buffer: ReadingBuffer::new(),
            filter: HeadingFilter::new(settings.filter),
            quality: SignalQualityMonitor::new(),
            gravity: LowPassVector::new(alpha),
            geomagnetic: LowPassVector::new(alpha),
            current_heading: 0.0,
            is_aligned: false,
            last_quality: QualityLevel::High,
            last_accepted_ms: None,
            last_animation_ms: None,
            last_quality_check_ms: None,
        }
    }

    /// Process one raw sensor sample
    ///
    /// Returns `None` when the sample is dropped: static mode, rate
    /// limiting, a sample kind the active mode does not consume, or a
    /// buffer still warming up (fewer than three readings). Returns the
    /// full update otherwise.
    pub fn process(&mut self, sample: SensorSample, now_ms: u64) -> Option<PipelineUpdate> {
        if self.mode == InputMode::Static {
            return None;
        }

        // Rate limiting: at most one accepted sample per interval
        if let Some(last) = self.last_accepted_ms
            && now_ms.saturating_sub(last) < self.settings.update_interval_ms
        {
            return None;
        }
        self.last_accepted_ms = Some(now_ms);

        let raw_heading = self.extract_heading(sample)?;

        // Calibration offset applies before the reading enters the buffer
        let adjusted = normalize_360(raw_heading + self.calibration_offset);
        self.buffer.add(adjusted, now_ms, self.quality.accuracy_weight());

        let mean = self.buffer.weighted_mean(now_ms)?;
        let filtered = self.filter.update(mean);

        // Calibration observes filtered headings; it never blocks the path
        self.calibration.ingest(filtered);

        let (quality, warning) = self.sample_quality(now_ms);
        let display = self.decide_display(filtered, now_ms);
        let alignment = self.compute_alignment(filtered);

        let aligned_notification = alignment.is_aligned && !self.is_aligned;
        self.is_aligned = alignment.is_aligned;
        if aligned_notification {
            info!("aligned with the Qibla at heading {:.1}°", filtered);
        }

        Some(PipelineUpdate {
            heading: filtered,
            alignment,
            distance_km: self.distance_km,
            quality,
            display,
            warning,
            aligned_notification,
        })
    }

    /// Heading extraction for the active input mode
    ///
    /// Sample kinds the mode does not consume are dropped.
    fn extract_heading(&mut self, sample: SensorSample) -> Option<f32> {
        match (self.mode, sample) {
            (InputMode::Rotation, SensorSample::RotationVector { heading }) => {
                Some(normalize_360(heading))
            }
            (InputMode::Magnetic, SensorSample::Accelerometer(vector)) => {
                self.gravity.filter(vector);
                self.magnetic_heading()
            }
            (InputMode::Magnetic, SensorSample::Magnetometer(vector)) => {
                self.geomagnetic.filter(vector);
                self.magnetic_heading()
            }
            _ => None,
        }
    }

    fn magnetic_heading(&self) -> Option<f32> {
        let gravity = self.gravity.value()?;
        let geomagnetic = self.geomagnetic.value()?;
        let heading = heading_from_vectors(gravity, geomagnetic)?;
        // Declination corrects magnetic north to true north
        Some(normalize_360(heading + self.settings.declination))
    }

    /// Animate when the change is worth showing or staleness demands it
    fn decide_display(&mut self, filtered: f32, now_ms: u64) -> DisplayEvent {
        let change = angle_difference(filtered, self.current_heading);
        let cooldown_elapsed = match self.last_animation_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.settings.animation_cooldown_ms,
            None => true,
        };

        if change >= self.settings.min_visual_change || cooldown_elapsed {
            let event = DisplayEvent::Animated {
                from: self.current_heading,
                to: filtered,
            };
            self.current_heading = filtered;
            self.last_animation_ms = Some(now_ms);
            event
        } else {
            DisplayEvent::TextOnly
        }
    }

    fn compute_alignment(&self, heading: f32) -> AlignmentState {
        let diff = signed_difference(self.bearing_to_target, heading);
        AlignmentState {
            bearing_to_target: self.bearing_to_target,
            current_heading: heading,
            signed_angle_difference: diff,
            is_aligned: diff.abs() <= self.settings.alignment_tolerance,
        }
    }

    /// Re-evaluate quality on its own cadence, reusing the last level
    /// in between
    fn sample_quality(&mut self, now_ms: u64) -> (QualityLevel, Option<QualityWarning>) {
        let due = match self.last_quality_check_ms {
            Some(last) => {
                now_ms.saturating_sub(last) >= self.settings.quality_check_interval_ms
            }
            None => true,
        };
        if !due {
            return (self.last_quality, None);
        }

        self.last_quality_check_ms = Some(now_ms);
        let (level, warning) = self.quality.evaluate(&self.buffer, now_ms);
        self.last_quality = level;
        (level, warning)
    }

    /// Record a sensor accuracy-class change notification
    pub fn set_accuracy_class(&mut self, class: AccuracyClass) {
        self.quality.set_accuracy_class(class);
    }

    /// Begin a calibration capture
    pub fn start_calibration(&mut self, now_ms: u64) {
        self.calibration.start(now_ms);
    }

    /// Fraction of the calibration window elapsed, in [0, 1]
    pub fn calibration_progress(&self, now_ms: u64) -> f32 {
        self.calibration.progress(now_ms)
    }

    /// Whether a calibration capture is running
    pub fn is_calibrating(&self) -> bool {
        self.calibration.is_capturing()
    }

    /// Advance the calibration timer, applying the offset on success
    ///
    /// Returns `Some` exactly once per capture. On success the new offset
    /// is applied immediately and persisted; a store failure is logged
    /// and the offset still takes effect for this session.
    pub fn poll_calibration(&mut self, now_ms: u64) -> Option<Result<f32, CompassError>> {
        let outcome = self.calibration.tick(now_ms)?;
        match &outcome {
            Ok(offset) => {
                self.calibration_offset = *offset;
                if let Err(error) = self.store.store_calibration_offset(*offset) {
                    warn!("calibration offset not persisted: {}", error);
                }
            }
            Err(error) => {
                warn!("calibration failed: {}", error);
            }
        }
        Some(outcome)
    }

    /// Persist the current heading and tear down transient state
    ///
    /// Buffered readings and filter state are discarded; nothing leaks
    /// into the next activation beyond the persisted offset and heading.
    pub fn suspend(&mut self, now_ms: u64) {
        if !self.buffer.is_empty()
            && let Err(error) = self.store.store_last_heading(self.current_heading, now_ms)
        {
            warn!("last heading not persisted: {}", error);
        }

        self.buffer.clear();
        self.filter.reset();
        self.gravity.reset();
        self.geomagnetic.reset();
        self.last_accepted_ms = None;
        self.last_animation_ms = None;
        self.last_quality_check_ms = None;
        self.is_aligned = false;
    }

    /// Seed the heading from the store when resuming shortly after a
    /// suspension, avoiding a visible jump from 0°
    pub fn resume(&mut self, now_ms: u64) {
        match self.store.load_last_heading() {
            Ok(Some((heading, stored_ms)))
                if now_ms.saturating_sub(stored_ms) <= self.settings.resume_window_ms =>
            {
                debug!("resuming from stored heading {:.1}°", heading);
                self.current_heading = normalize_360(heading);
            }
            Ok(_) => self.current_heading = 0.0,
            Err(error) => {
                warn!("stored heading unreadable, starting from 0: {}", error);
                self.current_heading = 0.0;
            }
        }
    }

    /// User-triggered reset of the reading buffer and filter
    pub fn reset_readings(&mut self) {
        self.buffer.clear();
        self.filter.reset();
    }

    /// Active input mode
    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Why the pipeline fell back to static mode, if it did
    pub fn fallback_reason(&self) -> Option<&CompassError> {
        self.fallback_reason.as_ref()
    }

    /// Great-circle bearing to the target, degrees in [0, 360)
    pub fn bearing_to_target(&self) -> f32 {
        self.bearing_to_target
    }

    /// Great-circle distance to the target, in kilometers
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Calibration offset currently applied to raw headings
    pub fn calibration_offset(&self) -> f32 {
        self.calibration_offset
    }

    /// Most recent displayed heading
    pub fn current_heading(&self) -> f32 {
        self.current_heading
    }

    /// Alignment against the current displayed heading
    ///
    /// In static mode this is the fixed view the host renders: the
    /// bearing and distance with an unmoving heading.
    pub fn alignment(&self) -> AlignmentState {
        self.compute_alignment(self.current_heading)
    }
}
