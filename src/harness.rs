//! Display harness.
//!
//! Owns a sensor and an engine, polls the sensor on a fixed interval and
//! renders the debug panels. All state lives in the [`Harness`] value; there
//! is nothing global.

use crate::config::PanelConfig;
use crate::core::{AffectDimensions, EmoteEngine, EngineError, InputPolicy, INPUT_MAX, INPUT_MIN};
use crate::sensor::{SensorError, SensorProvider, SensorReading};
use crate::stats::{create_shared_stats, SharedSessionStats};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// ANSI sequence clearing the terminal and homing the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// One harness tick: the sensor reading and its transform.
#[derive(Debug, Clone)]
pub struct Frame {
    pub reading: SensorReading,
    pub dimensions: AffectDimensions,
}

/// Why a tick produced no frame.
#[derive(Debug, Clone, PartialEq)]
pub enum HarnessError {
    Sensor(SensorError),
    Engine(EngineError),
}

impl std::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HarnessError::Sensor(e) => write!(f, "Sensor error: {e}"),
            HarnessError::Engine(e) => write!(f, "Engine error: {e}"),
        }
    }
}

impl std::error::Error for HarnessError {}

impl From<SensorError> for HarnessError {
    fn from(e: SensorError) -> Self {
        HarnessError::Sensor(e)
    }
}

impl From<EngineError> for HarnessError {
    fn from(e: EngineError) -> Self {
        HarnessError::Engine(e)
    }
}

/// Polls a sensor, transforms the value and renders the debug panels.
pub struct Harness<S: SensorProvider> {
    sensor: S,
    engine: EmoteEngine,
    policy: InputPolicy,
    panels: PanelConfig,
    stats: SharedSessionStats,
    clear_screen: bool,
}

impl<S: SensorProvider> Harness<S> {
    /// Create a harness with default panels, pass-through policy and fresh stats.
    pub fn new(sensor: S, engine: EmoteEngine) -> Self {
        Self {
            sensor,
            engine,
            policy: InputPolicy::default(),
            panels: PanelConfig::default(),
            stats: create_shared_stats(),
            clear_screen: false,
        }
    }

    pub fn with_policy(mut self, policy: InputPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_panels(mut self, panels: PanelConfig) -> Self {
        self.panels = panels;
        self
    }

    pub fn with_stats(mut self, stats: SharedSessionStats) -> Self {
        self.stats = stats;
        self
    }

    /// Clear the terminal before each redraw.
    pub fn with_clear_screen(mut self, clear_screen: bool) -> Self {
        self.clear_screen = clear_screen;
        self
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn engine(&self) -> &EmoteEngine {
        &self.engine
    }

    pub fn stats(&self) -> &SharedSessionStats {
        &self.stats
    }

    /// Poll the sensor once and transform the value.
    pub fn tick(&self) -> Result<Frame, HarnessError> {
        self.stats.record_poll();

        let reading = match self.sensor.read() {
            Ok(reading) => reading,
            Err(e) => {
                self.stats.record_sensor_failure();
                tracing::warn!(sensor = %self.sensor.sensor_type(), "sensor poll failed: {e}");
                return Err(e.into());
            }
        };

        if !(INPUT_MIN..=INPUT_MAX).contains(&reading.value) {
            self.stats.record_out_of_range();
            tracing::debug!(value = reading.value, policy = ?self.policy, "input outside [-1, 1]");
        }

        let dimensions = self
            .engine
            .transform_with_policy(reading.value, self.policy)?;
        self.stats.record_transform();

        tracing::trace!(
            input = reading.value,
            valence = dimensions.valence,
            arousal = dimensions.arousal,
            "tick"
        );

        Ok(Frame { reading, dimensions })
    }

    /// Render the enabled debug panels for a frame.
    pub fn render(&self, frame: &Frame) -> String {
        let mut sections = Vec::new();

        if self.panels.show_input {
            sections.push(format!(
                "[{}]\n{:.3}",
                self.panels.input_title, frame.reading.value
            ));
        }

        if self.panels.show_emote {
            sections.push(format!(
                "[{}]\n{}",
                self.panels.emote_title,
                frame.dimensions.display_text()
            ));
        }

        sections.join("\n\n")
    }

    /// Render a failed tick. The failure is shown, never a made-up value.
    pub fn render_failure(&self, error: &HarnessError) -> String {
        format!("[{}]\n{error}", self.sensor.sensor_type())
    }

    /// Poll on a fixed interval until `running` is cleared or the sensor
    /// disconnects. Returns the number of ticks performed.
    pub fn run<W: Write>(
        &self,
        running: &AtomicBool,
        interval: Duration,
        out: &mut W,
    ) -> std::io::Result<u64> {
        self.run_until(|_| running.load(Ordering::SeqCst), interval, out)
    }

    /// Poll exactly `ticks` times (or until the sensor disconnects).
    pub fn run_ticks<W: Write>(
        &self,
        ticks: u64,
        interval: Duration,
        out: &mut W,
    ) -> std::io::Result<u64> {
        self.run_until(|done| done < ticks, interval, out)
    }

    fn run_until<W, F>(
        &self,
        mut keep_going: F,
        interval: Duration,
        out: &mut W,
    ) -> std::io::Result<u64>
    where
        W: Write,
        F: FnMut(u64) -> bool,
    {
        tracing::info!(
            sensor = %self.sensor.sensor_type(),
            arousal_exponent = self.engine.arousal_exponent(),
            interval_ms = interval.as_millis() as u64,
            "harness started"
        );

        let mut ticks = 0u64;
        let mut last_render: Option<String> = None;

        while keep_going(ticks) {
            let started = Instant::now();

            let result = self.tick();
            ticks += 1;

            let text = match &result {
                Ok(frame) => self.render(frame),
                Err(e) => self.render_failure(e),
            };

            // Only redraw when something changed
            if last_render.as_deref() != Some(text.as_str()) {
                if self.clear_screen {
                    write!(out, "{CLEAR_SCREEN}")?;
                }
                writeln!(out, "{text}")?;
                out.flush()?;
                last_render = Some(text);
            }

            if let Err(HarnessError::Sensor(SensorError::Disconnected)) = result {
                tracing::info!("sensor disconnected, stopping harness");
                break;
            }

            if let Some(remaining) = interval.checked_sub(started.elapsed()) {
                thread::sleep(remaining);
            }
        }

        tracing::info!(ticks, "harness stopped");
        Ok(ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EngineConfig;
    use crate::sensor::{Biosensor, BiosensorConfig, ManualSlider, RawRange, SensorType};

    /// A provider that reports whatever it holds, without normalizing.
    struct RawProvider(f64);

    impl SensorProvider for RawProvider {
        fn current_value(&self) -> Result<f64, SensorError> {
            Ok(self.0)
        }

        fn is_connected(&self) -> bool {
            true
        }

        fn sensor_type(&self) -> SensorType {
            SensorType::Biosensor
        }
    }

    fn output_text(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_tick_transforms_slider_value() {
        let slider = ManualSlider::new();
        slider.handle().set_value(-0.5).unwrap();
        let harness = Harness::new(slider, EmoteEngine::default());

        let frame = harness.tick().unwrap();
        assert!((frame.dimensions.valence + 0.5).abs() < 1e-9);
        assert!((frame.dimensions.arousal - 0.25).abs() < 1e-9);

        let stats = harness.stats().snapshot();
        assert_eq!(stats.polls, 1);
        assert_eq!(stats.transforms, 1);
    }

    #[test]
    fn test_render_panels() {
        let harness = Harness::new(ManualSlider::with_value(0.5), EmoteEngine::default());
        let frame = harness.tick().unwrap();
        let text = harness.render(&frame);

        assert!(text.contains("[Input Values Test]\n0.500"));
        assert!(text.contains("[EMOTE Values Test]\nV: 0.50\nA: 0.25"));
    }

    #[test]
    fn test_disabled_panel_not_rendered() {
        let panels = PanelConfig {
            show_input: false,
            ..PanelConfig::default()
        };
        let harness =
            Harness::new(ManualSlider::new(), EmoteEngine::default()).with_panels(panels);
        let frame = harness.tick().unwrap();
        let text = harness.render(&frame);

        assert!(!text.contains("Input Values Test"));
        assert!(text.contains("EMOTE Values Test"));
    }

    #[test]
    fn test_sensor_failure_is_surfaced() {
        let (sensor, _tx) = Biosensor::new(BiosensorConfig::default()).unwrap();
        let harness = Harness::new(sensor, EmoteEngine::default());

        let err = harness.tick().unwrap_err();
        assert_eq!(err, HarnessError::Sensor(SensorError::NoReading));
        assert!(harness.render_failure(&err).contains("not produced a reading"));

        let stats = harness.stats().snapshot();
        assert_eq!(stats.sensor_failures, 1);
        assert_eq!(stats.transforms, 0);
    }

    #[test]
    fn test_run_ticks_redraws_only_on_change() {
        let harness = Harness::new(ManualSlider::with_value(0.3), EmoteEngine::default());
        let mut out = Vec::new();

        let ticks = harness
            .run_ticks(5, Duration::from_millis(1), &mut out)
            .unwrap();
        assert_eq!(ticks, 5);

        let text = output_text(out);
        assert_eq!(text.matches("[EMOTE Values Test]").count(), 1);
        assert_eq!(harness.stats().snapshot().polls, 5);
    }

    #[test]
    fn test_run_stops_on_disconnect() {
        let (sensor, tx) = Biosensor::new(BiosensorConfig {
            range: RawRange::new(0.0, 100.0),
            queue_capacity: 8,
        })
        .unwrap();
        tx.send(100.0).unwrap();
        drop(tx);

        let harness = Harness::new(sensor, EmoteEngine::default());
        let mut out = Vec::new();
        let running = AtomicBool::new(true);

        let ticks = harness
            .run(&running, Duration::from_millis(1), &mut out)
            .unwrap();
        assert_eq!(ticks, 1);
        assert!(output_text(out).contains("Sensor disconnected"));
    }

    #[test]
    fn test_reject_policy_accepts_normalized_input() {
        let engine = EmoteEngine::new(EngineConfig::with_exponent(2.0)).unwrap();
        let (sensor, tx) = Biosensor::new(BiosensorConfig::default()).unwrap();
        tx.send(0.75).unwrap();

        // Normalized biosensor values never leave [-1, 1], so reject passes
        let harness = Harness::new(sensor, engine).with_policy(InputPolicy::Reject);
        let frame = harness.tick().unwrap();
        assert!((frame.dimensions.valence - 0.5).abs() < 1e-9);
        assert_eq!(harness.stats().snapshot().out_of_range_inputs, 0);
    }

    #[test]
    fn test_out_of_range_input_under_each_policy() {
        let passed = Harness::new(RawProvider(1.5), EmoteEngine::default());
        let frame = passed.tick().unwrap();
        assert_eq!(frame.dimensions.valence, 1.5);
        assert_eq!(frame.dimensions.arousal, 2.25);
        assert_eq!(passed.stats().snapshot().out_of_range_inputs, 1);

        let clamped = Harness::new(RawProvider(1.5), EmoteEngine::default())
            .with_policy(InputPolicy::Clamp);
        let frame = clamped.tick().unwrap();
        assert_eq!(frame.dimensions.valence, 1.0);
        assert_eq!(frame.dimensions.arousal, 1.0);
        assert_eq!(clamped.stats().snapshot().out_of_range_inputs, 1);

        let rejected = Harness::new(RawProvider(1.5), EmoteEngine::default())
            .with_policy(InputPolicy::Reject);
        assert_eq!(
            rejected.tick().unwrap_err(),
            HarnessError::Engine(EngineError::OutOfRange(1.5))
        );
        let stats = rejected.stats().snapshot();
        assert_eq!(stats.out_of_range_inputs, 1);
        assert_eq!(stats.transforms, 0);
        assert_eq!(stats.sensor_failures, 0);
    }
}
