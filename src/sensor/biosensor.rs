//! Channel-fed biosensor.
//!
//! Raw samples (heart-rate variability, skin conductance, ...) arrive on a
//! bounded channel from whatever acquires them. The sensor keeps the most
//! recent sample and normalizes it from the configured raw range onto
//! [-1, 1] at poll time.

use crate::sensor::types::{SensorError, SensorProvider, SensorType};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// Raw range of the physical signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawRange {
    pub min: f64,
    pub max: f64,
}

impl Default for RawRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl RawRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check that the range is finite and non-empty.
    pub fn validate(&self) -> Result<(), SensorError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min >= self.max {
            return Err(SensorError::InvalidConfig(format!(
                "raw range must satisfy min < max, got [{}, {}]",
                self.min, self.max
            )));
        }
        // The span divides every sample during normalization
        if !(self.max - self.min).is_finite() {
            return Err(SensorError::InvalidConfig(format!(
                "raw range [{}, {}] is too wide to normalize",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Map a raw sample linearly onto [-1, 1], clamping at the range edges.
    pub fn normalize(&self, raw: f64) -> Result<f64, SensorError> {
        if !raw.is_finite() {
            return Err(SensorError::InvalidSample(raw));
        }
        let unit = (raw - self.min) / (self.max - self.min);
        Ok((unit * 2.0 - 1.0).clamp(-1.0, 1.0))
    }
}

/// Configuration for a channel-fed biosensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiosensorConfig {
    /// Raw signal range mapped onto [-1, 1]
    pub range: RawRange,
    /// Capacity of the sample queue
    pub queue_capacity: usize,
}

impl Default for BiosensorConfig {
    fn default() -> Self {
        Self {
            range: RawRange::default(),
            queue_capacity: 1_024,
        }
    }
}

/// A biosensor fed by raw samples over a channel.
///
/// Polling is single-threaded; the latest sample is cached in a `Cell`.
pub struct Biosensor {
    config: BiosensorConfig,
    receiver: Receiver<f64>,
    latest: Cell<Option<f64>>,
    disconnected: Cell<bool>,
}

impl Biosensor {
    /// Create a biosensor and the sender used to push raw samples into it.
    pub fn new(config: BiosensorConfig) -> Result<(Self, Sender<f64>), SensorError> {
        config.range.validate()?;
        if config.queue_capacity == 0 {
            return Err(SensorError::InvalidConfig(
                "queue capacity must be at least 1".to_string(),
            ));
        }

        let (sender, receiver) = bounded(config.queue_capacity);
        let sensor = Self {
            config,
            receiver,
            latest: Cell::new(None),
            disconnected: Cell::new(false),
        };
        Ok((sensor, sender))
    }

    /// The raw range this sensor normalizes from.
    pub fn range(&self) -> RawRange {
        self.config.range
    }

    /// Drain queued samples, keeping only the newest.
    fn drain(&self) {
        loop {
            match self.receiver.try_recv() {
                Ok(sample) => self.latest.set(Some(sample)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected.set(true);
                    break;
                }
            }
        }
    }
}

impl SensorProvider for Biosensor {
    fn current_value(&self) -> Result<f64, SensorError> {
        self.drain();

        if self.disconnected.get() {
            return Err(SensorError::Disconnected);
        }

        match self.latest.get() {
            Some(raw) => self.config.range.normalize(raw),
            None => Err(SensorError::NoReading),
        }
    }

    fn is_connected(&self) -> bool {
        self.drain();
        !self.disconnected.get()
    }

    fn sensor_type(&self) -> SensorType {
        SensorType::Biosensor
    }
}
