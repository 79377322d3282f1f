//! Sensor-facing types shared by every provider.
//!
//! A provider only ever hands out a normalized value in [-1, 1]. How that
//! value is acquired (slider, biosensor) is private to the provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of sensor currently providing input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    /// Manually positioned slider
    ManualSlider,
    /// Physiological sensor (HRV, skin conductance, ...)
    Biosensor,
}

impl SensorType {
    /// Parse a sensor name as accepted on the command line.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "slider" | "manual" | "manual_slider" => Some(SensorType::ManualSlider),
            "biosensor" | "bio" => Some(SensorType::Biosensor),
            _ => None,
        }
    }
}

impl std::fmt::Display for SensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorType::ManualSlider => write!(f, "manual slider"),
            SensorType::Biosensor => write!(f, "biosensor"),
        }
    }
}

/// Errors a sensor reports instead of producing a value.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorError {
    /// The sensor is no longer connected
    Disconnected,
    /// The sensor is connected but has not produced a sample yet
    NoReading,
    /// The sensor produced a sample that cannot be normalized
    InvalidSample(f64),
    /// The sensor was configured with an unusable range or setting
    InvalidConfig(String),
}

impl std::fmt::Display for SensorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorError::Disconnected => write!(f, "Sensor disconnected"),
            SensorError::NoReading => write!(f, "Sensor has not produced a reading yet"),
            SensorError::InvalidSample(v) => write!(f, "Sensor produced an invalid sample: {v}"),
            SensorError::InvalidConfig(e) => write!(f, "Invalid sensor configuration: {e}"),
        }
    }
}

impl std::error::Error for SensorError {}

/// A single successful poll of a sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    /// Normalized value in [-1, 1]
    pub value: f64,
    /// Which kind of sensor produced it
    pub sensor_type: SensorType,
    /// When the poll happened
    pub timestamp: DateTime<Utc>,
}

impl SensorReading {
    pub fn new(value: f64, sensor_type: SensorType) -> Self {
        Self {
            value,
            sensor_type,
            timestamp: Utc::now(),
        }
    }
}

/// Anything that can be polled for the user's current emotional state.
pub trait SensorProvider {
    /// Current normalized value in [-1, 1].
    fn current_value(&self) -> Result<f64, SensorError>;

    /// Whether the underlying sensor is connected.
    fn is_connected(&self) -> bool;

    /// The kind of sensor this is.
    fn sensor_type(&self) -> SensorType;

    /// Poll once and stamp the value with its time and source.
    fn read(&self) -> Result<SensorReading, SensorError> {
        let value = self.current_value()?;
        Ok(SensorReading::new(value, self.sensor_type()))
    }
}

impl<S: SensorProvider + ?Sized> SensorProvider for Box<S> {
    fn current_value(&self) -> Result<f64, SensorError> {
        (**self).current_value()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn sensor_type(&self) -> SensorType {
        (**self).sensor_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl SensorProvider for Fixed {
        fn current_value(&self) -> Result<f64, SensorError> {
            Ok(self.0)
        }

        fn is_connected(&self) -> bool {
            true
        }

        fn sensor_type(&self) -> SensorType {
            SensorType::ManualSlider
        }
    }

    #[test]
    fn test_sensor_type_parsing() {
        assert_eq!(SensorType::parse("slider"), Some(SensorType::ManualSlider));
        assert_eq!(SensorType::parse("Biosensor"), Some(SensorType::Biosensor));
        assert_eq!(SensorType::parse("camera"), None);
    }

    #[test]
    fn test_read_stamps_value() {
        let reading = Fixed(0.25).read().unwrap();
        assert_eq!(reading.value, 0.25);
        assert_eq!(reading.sensor_type, SensorType::ManualSlider);
    }

    #[test]
    fn test_boxed_provider_delegates() {
        let boxed: Box<dyn SensorProvider> = Box::new(Fixed(-0.5));
        assert_eq!(boxed.current_value(), Ok(-0.5));
        assert!(boxed.is_connected());
    }
}
