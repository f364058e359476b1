use qibla_compass::{Coordinate, HeadingPipeline, MemoryStore, SensorSample, SensorSuite};

const SAMPLE_INTERVAL_MS: u64 = 200; // matches the pipeline rate limit

fn main() {
    let origin = Coordinate::new(30.0444, 31.2357).unwrap(); // Cairo
    let suite = SensorSuite {
        rotation_vector: true,
        ..Default::default()
    };
    let mut pipeline = HeadingPipeline::new(origin, suite, MemoryStore::new());

    println!(
        "Qibla bearing {:.1}°, distance {:.0} km",
        pipeline.bearing_to_target(),
        pipeline.distance_km()
    );

    let mut now_ms = 0u64;
    for _ in 0..10 {
        // this loop should repeat each time a new sensor sample is available
        let heading = 135.0; // replace this with the rotation-vector heading in degrees

        if let Some(update) =
            pipeline.process(SensorSample::RotationVector { heading }, now_ms)
        {
            println!(
                "Heading: {:.1}°  Off by: {:+.1}°  Aligned: {}",
                update.heading,
                update.alignment.signed_angle_difference,
                update.alignment.is_aligned
            );
        }

        now_ms += SAMPLE_INTERVAL_MS;
    }
}
