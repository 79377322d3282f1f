//! Manual slider sensor.
//!
//! The value lives in an atomic so that whatever drives the slider (stdin
//! reader, test, UI) can move it from another thread while the harness
//! polls it.

use crate::sensor::types::{SensorError, SensorProvider, SensorType};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lowest slider position.
pub const SLIDER_MIN: f64 = -1.0;

/// Highest slider position.
pub const SLIDER_MAX: f64 = 1.0;

/// Step size of the slider.
pub const SLIDER_RESOLUTION: f64 = 0.001;

/// Snap a requested position onto the slider track.
fn quantize(value: f64) -> f64 {
    let clamped = value.clamp(SLIDER_MIN, SLIDER_MAX);
    let steps = (clamped / SLIDER_RESOLUTION).round();
    (steps * SLIDER_RESOLUTION).clamp(SLIDER_MIN, SLIDER_MAX)
}

/// A slider-backed sensor. Always connected.
#[derive(Debug, Clone)]
pub struct ManualSlider {
    position: Arc<AtomicU64>,
}

/// Cloneable handle used to move the slider.
#[derive(Debug, Clone)]
pub struct SliderHandle {
    position: Arc<AtomicU64>,
}

impl ManualSlider {
    /// Create a slider resting at the neutral center.
    pub fn new() -> Self {
        Self::with_value(0.0)
    }

    /// Create a slider at the given position.
    ///
    /// NaN positions fall back to the center.
    pub fn with_value(value: f64) -> Self {
        let value = if value.is_nan() { 0.0 } else { quantize(value) };
        Self {
            position: Arc::new(AtomicU64::new(value.to_bits())),
        }
    }

    /// Get a handle for moving this slider.
    pub fn handle(&self) -> SliderHandle {
        SliderHandle {
            position: self.position.clone(),
        }
    }

    /// Current slider position.
    pub fn value(&self) -> f64 {
        f64::from_bits(self.position.load(Ordering::SeqCst))
    }
}

impl Default for ManualSlider {
    fn default() -> Self {
        Self::new()
    }
}

impl SliderHandle {
    /// Move the slider. The position is clamped to the track and snapped to
    /// the slider resolution; the resulting position is returned.
    pub fn set_value(&self, value: f64) -> Result<f64, SensorError> {
        if value.is_nan() {
            return Err(SensorError::InvalidSample(value));
        }
        let snapped = quantize(value);
        self.position.store(snapped.to_bits(), Ordering::SeqCst);
        Ok(snapped)
    }

    /// Current slider position.
    pub fn value(&self) -> f64 {
        f64::from_bits(self.position.load(Ordering::SeqCst))
    }
}

impl SensorProvider for ManualSlider {
    fn current_value(&self) -> Result<f64, SensorError> {
        Ok(self.value())
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn sensor_type(&self) -> SensorType {
        SensorType::ManualSlider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slider_starts_neutral() {
        let slider = ManualSlider::new();
        assert_eq!(slider.current_value(), Ok(0.0));
        assert!(slider.is_connected());
        assert_eq!(slider.sensor_type(), SensorType::ManualSlider);
    }

    #[test]
    fn test_handle_moves_slider() {
        let slider = ManualSlider::new();
        let handle = slider.handle();
        handle.set_value(0.5).unwrap();
        assert!((slider.current_value().unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(handle.value(), slider.value());
    }

    #[test]
    fn test_slider_clamps_to_track() {
        let slider = ManualSlider::new();
        let handle = slider.handle();
        assert_eq!(handle.set_value(4.0), Ok(1.0));
        assert_eq!(handle.set_value(-9.0), Ok(-1.0));
        assert_eq!(ManualSlider::with_value(2.0).value(), 1.0);
    }

    #[test]
    fn test_slider_resolution() {
        let slider = ManualSlider::new();
        let snapped = slider.handle().set_value(0.12345).unwrap();
        assert!((snapped - 0.123).abs() < 1e-9);
    }

    #[test]
    fn test_nan_rejected() {
        let slider = ManualSlider::with_value(0.4);
        assert!(slider.handle().set_value(f64::NAN).is_err());
        assert!((slider.value() - 0.4).abs() < 1e-9);
    }
}
