//! Signal-quality assessment for the compass reading stream

use log::warn;

use crate::buffer::ReadingBuffer;

/// Quality monitor constants
const VARIANCE_HIGH: f32 = 5.0;
const VARIANCE_MEDIUM: f32 = 15.0;
const VARIANCE_LOW: f32 = 35.0;
const MIN_READINGS_FOR_VARIANCE: usize = 5;
const WARNING_DEBOUNCE_MS: u64 = 10_000;

/// Sensor-reported accuracy class
///
/// The four-level classification reported by the host sensor layer.
/// Its weight is what the per-reading `accuracy_weight` derives from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccuracyClass {
    High,
    Medium,
    Low,
    #[default]
    Unreliable,
}

impl AccuracyClass {
    /// Weight applied to readings taken under this accuracy class
    pub fn weight(&self) -> f32 {
        match self {
            AccuracyClass::High => 1.0,
            AccuracyClass::Medium => 0.7,
            AccuracyClass::Low => 0.4,
            AccuracyClass::Unreliable => 0.2,
        }
    }
}

/// Overall signal quality derived from reading variance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityLevel {
    High,
    Medium,
    Low,
    /// Variance consistent with strong magnetic interference
    Critical,
}

impl QualityLevel {
    /// Classify a reading variance (degrees²) into a quality level
    pub fn from_variance(variance: f32) -> Self {
        if variance < VARIANCE_HIGH {
            QualityLevel::High
        } else if variance < VARIANCE_MEDIUM {
            QualityLevel::Medium
        } else if variance < VARIANCE_LOW {
            QualityLevel::Low
        } else {
            QualityLevel::Critical
        }
    }
}

/// Debounced warning category surfaced to the host
///
/// The host owns turning these into display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityWarning {
    /// Sensor reports itself unreliable; metal or magnets nearby
    LowAccuracy,
    /// Readings are scattered; the device is not being held steady
    Unstable,
    /// Variance consistent with strong magnetic interference
    Interference,
}

/// Arithmetic variance of raw angle values, `mean(x²) − mean(x)²`
///
/// Deliberately *not* circular-corrected: the quality thresholds above
/// were calibrated against this formula, so it is preserved as a known
/// approximation. It over-reports spread for reading sets straddling the
/// 0°/360° boundary.
pub fn variance(angles: impl Iterator<Item = f32>) -> f32 {
    let mut sum = 0.0f32;
    let mut sum_squares = 0.0f32;
    let mut count = 0usize;

    for angle in angles {
        sum += angle;
        sum_squares += angle * angle;
        count += 1;
    }

    if count == 0 {
        return 0.0;
    }

    let n = count as f32;
    let mean = sum / n;
    sum_squares / n - mean * mean
}

/// Tracks reading variance and sensor accuracy, emitting quality levels
/// and debounced warnings
///
/// Warnings are raised at most once per 10-second window regardless of
/// how many threshold breaches occur inside it.
#[derive(Debug, Clone, Default)]
pub struct SignalQualityMonitor {
    accuracy_class: AccuracyClass,
    last_variance: f32,
    last_warning_ms: Option<u64>,
}

impl SignalQualityMonitor {
    /// Create a monitor with no readings observed yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sensor accuracy-class change notification
    pub fn set_accuracy_class(&mut self, class: AccuracyClass) {
        self.accuracy_class = class;
    }

    /// Most recently reported accuracy class
    pub fn accuracy_class(&self) -> AccuracyClass {
        self.accuracy_class
    }

    /// Weight for new readings under the current accuracy class
    pub fn accuracy_weight(&self) -> f32 {
        self.accuracy_class.weight()
    }

    /// Variance from the most recent evaluation, in degrees²
    pub fn last_variance(&self) -> f32 {
        self.last_variance
    }

    /// Evaluate the current buffer contents
    ///
    /// Recomputes the variance once at least five readings are buffered
    /// (keeping the previous value otherwise), classifies it, and decides
    /// whether a warning is due. Returns the quality level and, at most
    /// once per debounce window, a warning category.
    pub fn evaluate(&mut self, buffer: &ReadingBuffer, now_ms: u64) -> (QualityLevel, Option<QualityWarning>) {
        if buffer.len() >= MIN_READINGS_FOR_VARIANCE {
            self.last_variance = variance(buffer.angles());
        }

        let level = QualityLevel::from_variance(self.last_variance);
        let pending = self.pending_warning(level);
        let emitted = pending.filter(|_| self.debounce_elapsed(now_ms));

        if let Some(warning) = emitted {
            self.last_warning_ms = Some(now_ms);
            warn!(
                "signal quality warning: {:?} (variance {:.1}, class {:?})",
                warning, self.last_variance, self.accuracy_class
            );
        }

        (level, emitted)
    }

    fn pending_warning(&self, level: QualityLevel) -> Option<QualityWarning> {
        if self.accuracy_class == AccuracyClass::Unreliable {
            Some(QualityWarning::LowAccuracy)
        } else {
            match level {
                QualityLevel::Critical => Some(QualityWarning::Interference),
                QualityLevel::Low => Some(QualityWarning::Unstable),
                _ => None,
            }
        }
    }

    fn debounce_elapsed(&self, now_ms: u64) -> bool {
        match self.last_warning_ms {
            Some(last) => now_ms.saturating_sub(last) >= WARNING_DEBOUNCE_MS,
            None => true,
        }
    }
}
