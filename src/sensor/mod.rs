//! Sensor providers for the HandBand front end.
//!
//! Every provider hands out a single normalized value in [-1, 1]. The rest
//! of the system treats the provider as a black box and never needs to know
//! whether a slider or a biosensor is behind it.

pub mod biosensor;
pub mod slider;
pub mod types;

// Re-export commonly used types
pub use biosensor::{Biosensor, BiosensorConfig, RawRange};
pub use slider::{ManualSlider, SliderHandle, SLIDER_MAX, SLIDER_MIN, SLIDER_RESOLUTION};
pub use types::{SensorError, SensorProvider, SensorReading, SensorType};
