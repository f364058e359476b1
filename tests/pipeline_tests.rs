use std::cell::RefCell;
use std::rc::Rc;

use nalgebra::Vector3;
use qibla_compass::{
    CompassError, CompassStore, Coordinate, DisplayEvent, HeadingPipeline, InputMode, MemoryStore,
    PipelineSettings, SensorSample, SensorSuite, angle,
};

fn cairo() -> Coordinate {
    Coordinate::new(30.0444, 31.2357).unwrap()
}

fn rotation_suite() -> SensorSuite {
    SensorSuite {
        rotation_vector: true,
        ..Default::default()
    }
}

fn magnetic_suite() -> SensorSuite {
    SensorSuite {
        accelerometer: true,
        magnetometer: true,
        ..Default::default()
    }
}

/// Magnetometer vector producing the given heading on a level device
fn mag_for_heading(heading_deg: f32) -> Vector3<f32> {
    let rad = heading_deg.to_radians();
    Vector3::new(rad.cos(), -rad.sin(), 0.0)
}

/// Store shared between the test and the pipeline
#[derive(Clone, Default)]
struct SharedStore(Rc<RefCell<MemoryStore>>);

impl CompassStore for SharedStore {
    fn load_calibration_offset(&self) -> Result<Option<f32>, CompassError> {
        self.0.borrow().load_calibration_offset()
    }
    fn store_calibration_offset(&mut self, offset: f32) -> Result<(), CompassError> {
        self.0.borrow_mut().store_calibration_offset(offset)
    }
    fn load_last_heading(&self) -> Result<Option<(f32, u64)>, CompassError> {
        self.0.borrow().load_last_heading()
    }
    fn store_last_heading(&mut self, heading: f32, timestamp_ms: u64) -> Result<(), CompassError> {
        self.0.borrow_mut().store_last_heading(heading, timestamp_ms)
    }
}

/// Store whose every operation fails
struct FailingStore;

impl CompassStore for FailingStore {
    fn load_calibration_offset(&self) -> Result<Option<f32>, CompassError> {
        Err(CompassError::Store("unreadable".into()))
    }
    fn store_calibration_offset(&mut self, _offset: f32) -> Result<(), CompassError> {
        Err(CompassError::Store("unwritable".into()))
    }
    fn load_last_heading(&self) -> Result<Option<(f32, u64)>, CompassError> {
        Err(CompassError::Store("unreadable".into()))
    }
    fn store_last_heading(&mut self, _heading: f32, _timestamp_ms: u64) -> Result<(), CompassError> {
        Err(CompassError::Store("unwritable".into()))
    }
}

#[test]
fn magnetic_mode_settles_near_north() {
    let mut pipeline = HeadingPipeline::new(cairo(), magnetic_suite(), MemoryStore::new());
    assert_eq!(pipeline.mode(), InputMode::Magnetic);

    let level = Vector3::new(0.0, 0.0, 1.0);
    let mut now = 0u64;

    // Seed the gravity filter, then alternate magnetometer readings that
    // straddle the 0°/360° boundary
    pipeline.process(SensorSample::Accelerometer(level), now);
    now += 200;

    let mut last_update = None;
    for heading in [0.0f32, 2.0, 359.0, 1.0, 358.0, 2.0] {
        if let Some(update) =
            pipeline.process(SensorSample::Magnetometer(mag_for_heading(heading)), now)
        {
            last_update = Some(update);
        }
        now += 200;
    }

    let update = last_update.expect("buffer should have warmed up");
    assert!(
        angle::angle_difference(update.heading, 0.0) < 5.0,
        "heading should settle near north, got {}",
        update.heading
    );

    // Alignment difference is consistent with the known bearing
    let expected = angle::signed_difference(pipeline.bearing_to_target(), update.heading);
    assert!(
        (update.alignment.signed_angle_difference - expected).abs() < 1e-3,
        "alignment difference {} vs expected {}",
        update.alignment.signed_angle_difference,
        expected
    );
}

#[test]
fn declination_shifts_magnetic_heading() {
    let settings = PipelineSettings {
        declination: 5.0,
        ..Default::default()
    };
    let mut pipeline =
        HeadingPipeline::with_settings(cairo(), magnetic_suite(), MemoryStore::new(), settings);

    let level = Vector3::new(0.0, 0.0, 1.0);
    let mut now = 0u64;
    pipeline.process(SensorSample::Accelerometer(level), now);
    now += 200;

    let mut last_update = None;
    for _ in 0..6 {
        if let Some(update) =
            pipeline.process(SensorSample::Magnetometer(mag_for_heading(0.0)), now)
        {
            last_update = Some(update);
        }
        now += 200;
    }

    let update = last_update.expect("buffer should have warmed up");
    assert!(
        (update.heading - 5.0).abs() < 1.0,
        "declination should shift the heading to ~5°, got {}",
        update.heading
    );
}

#[test]
fn wraparound_stream_never_jumps() {
    let mut pipeline = HeadingPipeline::new(cairo(), rotation_suite(), MemoryStore::new());

    let mut now = 0u64;
    let mut previous: Option<f32> = None;
    for _ in 0..10 {
        for heading in [350.0f32, 10.0] {
            if let Some(update) =
                pipeline.process(SensorSample::RotationVector { heading }, now)
            {
                if let Some(prev) = previous {
                    let jump = angle::angle_difference(update.heading, prev);
                    assert!(jump < 90.0, "heading jumped {}° near the boundary", jump);
                }
                assert!(
                    angle::angle_difference(update.heading, 0.0) <= 20.0,
                    "estimate left the boundary band: {}",
                    update.heading
                );
                previous = Some(update.heading);
            }
            now += 200;
        }
    }
    assert!(previous.is_some(), "stream should have produced updates");
}

#[test]
fn flood_of_samples_does_not_starve_display() {
    // The 200ms rate limit and 600ms animation cooldown interact; under a
    // sustained 50Hz flood of sub-threshold changes the display must still
    // animate at least once per cooldown-plus-one-accepted-interval.
    let mut pipeline = HeadingPipeline::new(cairo(), rotation_suite(), MemoryStore::new());

    let mut now = 0u64;
    let mut heading = 100.0f32;
    let mut last_animated: Option<u64> = None;
    let mut animated_count = 0u32;
    let mut warm = false;

    while now < 10_000 {
        // Sub-threshold drift: well under the 3° animation trigger
        heading = angle::normalize_360(heading + 0.05);
        if let Some(update) = pipeline.process(SensorSample::RotationVector { heading }, now) {
            warm = true;
            if matches!(update.display, DisplayEvent::Animated { .. }) {
                if let Some(last) = last_animated {
                    assert!(
                        now - last <= 800,
                        "display starved for {}ms at t={}",
                        now - last,
                        now
                    );
                }
                last_animated = Some(now);
                animated_count += 1;
            }
        }
        now += 20; // 50Hz sensor delivery
    }

    assert!(warm, "pipeline never warmed up");
    assert!(animated_count >= 10, "only {} animated updates in 10s", animated_count);
}

#[test]
fn small_changes_refresh_text_only() {
    let mut pipeline = HeadingPipeline::new(cairo(), rotation_suite(), MemoryStore::new());

    let mut now = 0u64;
    for _ in 0..4 {
        pipeline.process(SensorSample::RotationVector { heading: 100.0 }, now);
        now += 200;
    }

    // A sub-threshold change right after an animation: text-only
    let update = pipeline
        .process(SensorSample::RotationVector { heading: 100.5 }, now)
        .expect("buffer warm");
    assert_eq!(update.display, DisplayEvent::TextOnly);
}

#[test]
fn calibration_round_trip_through_pipeline() {
    let store = SharedStore::default();
    let mut pipeline = HeadingPipeline::new(cairo(), rotation_suite(), store.clone());

    pipeline.start_calibration(0);
    assert!(pipeline.is_calibrating());

    // 16 seconds of steady readings at 90°
    let mut now = 0u64;
    let mut outcome = None;
    while now <= 16_000 {
        pipeline.process(SensorSample::RotationVector { heading: 90.0 }, now);
        if let Some(result) = pipeline.poll_calibration(now) {
            outcome = Some(result);
        }
        now += 200;
    }

    let offset = outcome
        .expect("calibration should finish after 15s")
        .expect("enough samples captured");
    assert!((offset - 270.0).abs() < 1.0, "offset: {}", offset);
    assert_eq!(pipeline.calibration_offset(), offset);

    // Offset persisted to the store
    let persisted = store.load_calibration_offset().unwrap().expect("offset stored");
    assert!((persisted - offset).abs() < 1e-6);

    // With the offset applied, raw 90° readings now display as north
    pipeline.reset_readings();
    let mut last_update = None;
    for _ in 0..4 {
        if let Some(update) = pipeline.process(SensorSample::RotationVector { heading: 90.0 }, now)
        {
            last_update = Some(update);
        }
        now += 200;
    }
    let update = last_update.expect("buffer re-warmed");
    assert!(
        angle::angle_difference(update.heading, 0.0) < 1.0,
        "calibrated heading should be ~0°, got {}",
        update.heading
    );
}

#[test]
fn calibration_with_too_few_samples_fails() {
    let mut pipeline = HeadingPipeline::new(cairo(), rotation_suite(), MemoryStore::new());
    let before = pipeline.calibration_offset();

    pipeline.start_calibration(0);
    // Only two samples reach the filter before the window closes
    pipeline.process(SensorSample::RotationVector { heading: 90.0 }, 0);
    pipeline.process(SensorSample::RotationVector { heading: 90.0 }, 200);
    pipeline.process(SensorSample::RotationVector { heading: 90.0 }, 400);
    pipeline.process(SensorSample::RotationVector { heading: 90.0 }, 600);

    let outcome = pipeline.poll_calibration(15_000).expect("window elapsed");
    assert!(matches!(
        outcome,
        Err(CompassError::InsufficientCalibrationData { .. })
    ));
    assert_eq!(pipeline.calibration_offset(), before);
    assert!(!pipeline.is_calibrating());
}

#[test]
fn store_failures_are_non_fatal() {
    let mut pipeline = HeadingPipeline::new(cairo(), rotation_suite(), FailingStore);

    // Unreadable store: offset reverts to the default
    assert_eq!(pipeline.calibration_offset(), 0.0);

    // Processing works normally
    let mut now = 0u64;
    let mut got_update = false;
    for _ in 0..4 {
        if pipeline
            .process(SensorSample::RotationVector { heading: 45.0 }, now)
            .is_some()
        {
            got_update = true;
        }
        now += 200;
    }
    assert!(got_update);

    // Suspend and resume tolerate write/read failures
    pipeline.suspend(now);
    pipeline.resume(now + 1000);
    assert_eq!(pipeline.current_heading(), 0.0);

    // A successful calibration still takes effect in-memory
    pipeline.start_calibration(now);
    for _ in 0..12 {
        pipeline.process(SensorSample::RotationVector { heading: 90.0 }, now);
        now += 200;
    }
    let outcome = pipeline.poll_calibration(now + 15_000).expect("window elapsed");
    let offset = outcome.expect("enough samples");
    assert_eq!(pipeline.calibration_offset(), offset);
}

#[test]
fn bearing_and_distance_exposed_in_every_update() {
    let mut pipeline = HeadingPipeline::new(cairo(), rotation_suite(), MemoryStore::new());
    let bearing = pipeline.bearing_to_target();
    let distance = pipeline.distance_km();

    // Cairo to Mecca: south-east, roughly 1300km
    assert!((100.0..180.0).contains(&bearing), "bearing: {}", bearing);
    assert!((1200.0..1500.0).contains(&distance), "distance: {}", distance);

    let mut now = 0u64;
    for _ in 0..4 {
        if let Some(update) = pipeline.process(SensorSample::RotationVector { heading: 10.0 }, now)
        {
            assert_eq!(update.alignment.bearing_to_target, bearing);
            assert_eq!(update.distance_km, distance);
        }
        now += 200;
    }
}
