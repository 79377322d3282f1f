//! HandBand - affective front end.
//!
//! This library turns a single emotional-state value into the two
//! dimensions of the circumplex model of affect, for downstream musical and
//! sonic interpretation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          HandBand                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │   Sensor    │──▶│    EMOTE    │──▶│   Harness   │       │
//! │  │ (slider/bio)│   │  (V, A)     │   │  (panels)   │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │                                              │              │
//! │                                              ▼              │
//! │                                      ┌─────────────┐       │
//! │                                      │   Session   │       │
//! │                                      │    Stats    │       │
//! │                                      └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use handband::core::{EmoteEngine, EngineConfig};
//!
//! let engine = EmoteEngine::new(EngineConfig::with_exponent(2.0)).unwrap();
//! let dims = engine.transform(-0.5);
//!
//! assert_eq!(dims.valence, -0.5);
//! assert_eq!(dims.arousal, 0.25);
//! ```

pub mod config;
pub mod core;
pub mod harness;
pub mod sensor;
pub mod stats;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, PanelConfig};
pub use crate::core::{AffectDimensions, EmoteEngine, EngineConfig, EngineError, InputPolicy};
pub use harness::{Frame, Harness, HarnessError};
pub use sensor::{ManualSlider, SensorError, SensorProvider, SensorType};
pub use stats::{SessionStats, SharedSessionStats, StatsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
