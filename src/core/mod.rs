//! Core functionality for HandBand.
//!
//! This module contains the EMOTE engine, which maps one emotional-state
//! value onto valence and arousal.

pub mod engine;

// Re-export commonly used types
pub use engine::{
    AffectDimensions, EmoteEngine, EngineConfig, EngineError, InputPolicy,
    DEFAULT_AROUSAL_EXPONENT, INPUT_MAX, INPUT_MIN,
};
