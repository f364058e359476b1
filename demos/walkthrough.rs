//! Full pipeline walkthrough
//!
//! Demonstrates the magnetic input mode (accelerometer + magnetometer
//! with low-pass pre-filtering), a calibration capture, accuracy-class
//! changes, turn guidance, and the suspend/resume cycle.
//!
//! Run with: `cargo run --example walkthrough`

use nalgebra::Vector3;
use qibla_compass::{
    AccuracyClass, CardinalDirection, Coordinate, HeadingPipeline, MemoryStore, PipelineSettings,
    SensorSample, SensorSuite, TurnInstruction, TurnSide,
};

const SAMPLE_INTERVAL_MS: u64 = 200;

/// Synthesize a level-device magnetometer vector for a given heading
fn mag_for_heading(heading_deg: f32) -> Vector3<f32> {
    let rad = heading_deg.to_radians();
    Vector3::new(rad.cos(), -rad.sin(), 0.0)
}

fn describe_turn(signed_difference: f32) -> String {
    let side = |s: TurnSide| match s {
        TurnSide::Left => "left",
        TurnSide::Right => "right",
    };
    match TurnInstruction::from_difference(signed_difference) {
        TurnInstruction::VeryClose(s) => format!("nudge slightly {}", side(s)),
        TurnInstruction::Turn(s, deg) => format!("turn {} about {:.0}°", side(s), deg),
        TurnInstruction::TurnHard(s) => format!("turn hard {}", side(s)),
        TurnInstruction::TurnAround => "turn around".to_string(),
    }
}

fn main() {
    let origin = Coordinate::new(51.5074, -0.1278).unwrap(); // London
    let suite = SensorSuite {
        accelerometer: true,
        magnetometer: true,
        ..Default::default()
    };
    let settings = PipelineSettings {
        declination: 0.3, // London, roughly
        ..Default::default()
    };
    let mut pipeline =
        HeadingPipeline::with_settings(origin, suite, MemoryStore::new(), settings);

    println!("Walkthrough - magnetic mode with calibration and guidance");
    println!(
        "Qibla bearing {:.1}° ({}), distance {:.0} km, mode {:?}",
        pipeline.bearing_to_target(),
        CardinalDirection::from_degrees(pipeline.bearing_to_target()).abbreviation(),
        pipeline.distance_km(),
        pipeline.mode(),
    );

    let mut now_ms = 0u64;
    let level = Vector3::new(0.0, 0.0, 1.0);

    // Phase 1: normal tracking. The device slowly swings from east toward
    // the Qibla bearing.
    println!("\n-- tracking --");
    pipeline.set_accuracy_class(AccuracyClass::High);
    let bearing = pipeline.bearing_to_target();
    for step in 0..20 {
        let heading = 90.0 + (bearing - 90.0) * (step as f32 / 19.0);

        pipeline.process(SensorSample::Accelerometer(level), now_ms);
        now_ms += SAMPLE_INTERVAL_MS;
        if let Some(update) =
            pipeline.process(SensorSample::Magnetometer(mag_for_heading(heading)), now_ms)
        {
            println!(
                "t={:5}ms  heading {:6.1}°  quality {:?}  {}",
                now_ms,
                update.heading,
                update.quality,
                describe_turn(update.alignment.signed_angle_difference),
            );
            if update.aligned_notification {
                println!("           *** aligned with the Qibla ***");
            }
        }
        now_ms += SAMPLE_INTERVAL_MS;
    }

    // Phase 2: calibration. Hold the device at a known reference while
    // the capture window runs; the resulting offset is applied to every
    // subsequent reading.
    println!("\n-- calibration --");
    pipeline.start_calibration(now_ms);
    let mut ticks = 0u32;
    while pipeline.is_calibrating() {
        pipeline.process(SensorSample::Accelerometer(level), now_ms);
        now_ms += SAMPLE_INTERVAL_MS;
        pipeline.process(SensorSample::Magnetometer(mag_for_heading(bearing)), now_ms);
        now_ms += SAMPLE_INTERVAL_MS;

        match pipeline.poll_calibration(now_ms) {
            Some(Ok(offset)) => println!("calibration complete, offset {:.1}°", offset),
            Some(Err(error)) => println!("calibration failed: {}", error),
            None => {
                ticks += 1;
                if ticks % 8 == 0 {
                    let pct = pipeline.calibration_progress(now_ms) * 100.0;
                    println!("calibrating... {:3.0}%", pct);
                }
            }
        }
    }

    // Phase 3: degraded accuracy. The host reported an unreliable sensor;
    // readings are down-weighted and a warning becomes due.
    println!("\n-- degraded accuracy --");
    pipeline.set_accuracy_class(AccuracyClass::Unreliable);
    for _ in 0..20 {
        pipeline.process(SensorSample::Accelerometer(level), now_ms);
        now_ms += SAMPLE_INTERVAL_MS;
        if let Some(update) =
            pipeline.process(SensorSample::Magnetometer(mag_for_heading(bearing)), now_ms)
        {
            if let Some(warning) = update.warning {
                println!("t={:5}ms  warning: {:?}", now_ms, warning);
            }
        }
        now_ms += SAMPLE_INTERVAL_MS;
    }

    // Phase 4: suspend and resume. Transient state is discarded; the last
    // heading survives a short pause so the rose does not jump to 0°.
    println!("\n-- suspend/resume --");
    let before = pipeline.current_heading();
    pipeline.suspend(now_ms);
    now_ms += 5_000;
    pipeline.resume(now_ms);
    println!(
        "suspended at {:.1}°, resumed at {:.1}° after 5s",
        before,
        pipeline.current_heading(),
    );
}
