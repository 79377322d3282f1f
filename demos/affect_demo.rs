//! Demonstration of the HandBand affect pipeline.
//!
//! Sweeps a manual slider from -1 to +1 and prints the valence/arousal pair
//! for a few arousal exponents.
//!
//! Run with: cargo run --example affect_demo

use handband::{
    core::{EmoteEngine, EngineConfig},
    harness::Harness,
    sensor::ManualSlider,
};

fn main() {
    println!("HandBand - Affect Demo");
    println!("======================");
    println!();

    for exponent in [1.0, 2.0, 3.0] {
        let engine = match EmoteEngine::new(EngineConfig::with_exponent(exponent)) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("Skipping exponent {exponent}: {e}");
                continue;
            }
        };

        let slider = ManualSlider::new();
        let handle = slider.handle();
        let harness = Harness::new(slider, engine);

        println!("Arousal exponent {exponent}:");
        println!("  input    valence  arousal");

        for step in -4..=4 {
            let position = step as f64 / 4.0;
            if let Err(e) = handle.set_value(position) {
                eprintln!("  could not move slider: {e}");
                continue;
            }

            match harness.tick() {
                Ok(frame) => println!(
                    "  {:>6.3}   {:>6.3}   {:>6.3}",
                    frame.reading.value, frame.dimensions.valence, frame.dimensions.arousal
                ),
                Err(e) => eprintln!("  tick failed: {e}"),
            }
        }
        println!();
    }
}
