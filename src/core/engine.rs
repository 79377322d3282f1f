//! EMOTE transformation engine.
//!
//! Projects a single emotional-state value in [-1, 1] onto the two
//! dimensions of the circumplex model:
//!
//! - **Valence** follows the input linearly.
//! - **Arousal** is `|input| ^ arousal_exponent`, a symmetric U-shaped curve
//!   where both extremes are highly activated and the neutral center is calm.
//!
//! The engine makes no musical or sonic decisions. It only outputs the
//! abstract pair for downstream interpreters.

use serde::{Deserialize, Serialize};

/// Default arousal exponent (quadratic curve).
pub const DEFAULT_AROUSAL_EXPONENT: f64 = 2.0;

/// Lower bound of the normalized input range.
pub const INPUT_MIN: f64 = -1.0;

/// Upper bound of the normalized input range.
pub const INPUT_MAX: f64 = 1.0;

/// Engine configuration, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Exponent of the arousal power law (must be finite and > 0)
    pub arousal_exponent: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            arousal_exponent: DEFAULT_AROUSAL_EXPONENT,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with the given arousal exponent.
    pub fn with_exponent(arousal_exponent: f64) -> Self {
        Self { arousal_exponent }
    }

    /// Check that the exponent is a positive finite number.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.arousal_exponent.is_finite() && self.arousal_exponent > 0.0 {
            Ok(())
        } else {
            Err(EngineError::InvalidExponent(self.arousal_exponent))
        }
    }
}

/// The valence/arousal pair produced by a single transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffectDimensions {
    /// Hedonic quality, unpleasant (-1) to pleasant (+1)
    pub valence: f64,
    /// Activation, calm (0) to highly activated (1)
    pub arousal: f64,
}

impl AffectDimensions {
    /// Two-line text used by the EMOTE debug panel.
    pub fn display_text(&self) -> String {
        format!("V: {:.2}\nA: {:.2}", self.valence, self.arousal)
    }
}

/// How the engine treats input outside [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPolicy {
    /// Feed the value through the formulas unchanged
    #[default]
    PassThrough,
    /// Clamp to [-1, 1] before transforming
    Clamp,
    /// Return an error for out-of-range or non-finite input
    Reject,
}

impl InputPolicy {
    /// Parse a policy name as accepted on the command line.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "pass-through" | "passthrough" => Some(InputPolicy::PassThrough),
            "clamp" => Some(InputPolicy::Clamp),
            "reject" => Some(InputPolicy::Reject),
            _ => None,
        }
    }
}

/// Errors raised around the transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineError {
    /// Exponent is zero, negative, or not finite
    InvalidExponent(f64),
    /// Input is outside [-1, 1] or not finite
    OutOfRange(f64),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidExponent(k) => {
                write!(f, "Arousal exponent must be a positive finite number, got {k}")
            }
            EngineError::OutOfRange(v) => {
                write!(f, "Input value {v} is outside the normalized range [-1, 1]")
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Stateless valence/arousal transformation engine.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EmoteEngine {
    config: EngineConfig,
}

impl EmoteEngine {
    /// Create an engine, rejecting exponents that are not positive and finite.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The exponent this engine was built with.
    pub fn arousal_exponent(&self) -> f64 {
        self.config.arousal_exponent
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Transform an emotional-state value into valence and arousal.
    ///
    /// Input is not validated: values beyond [-1, 1] go through the same
    /// formulas and produce arousal above 1.
    pub fn transform(&self, input_value: f64) -> AffectDimensions {
        AffectDimensions {
            valence: input_value,
            arousal: input_value.abs().powf(self.config.arousal_exponent),
        }
    }

    /// Like [`transform`](Self::transform), but rejects non-finite input and
    /// values outside [-1, 1].
    pub fn transform_checked(&self, input_value: f64) -> Result<AffectDimensions, EngineError> {
        if !input_value.is_finite() || !(INPUT_MIN..=INPUT_MAX).contains(&input_value) {
            return Err(EngineError::OutOfRange(input_value));
        }
        Ok(self.transform(input_value))
    }

    /// Transform under an explicit out-of-range policy.
    pub fn transform_with_policy(
        &self,
        input_value: f64,
        policy: InputPolicy,
    ) -> Result<AffectDimensions, EngineError> {
        match policy {
            InputPolicy::PassThrough => Ok(self.transform(input_value)),
            InputPolicy::Clamp => {
                // NaN has no meaningful clamp target
                if input_value.is_nan() {
                    return Err(EngineError::OutOfRange(input_value));
                }
                Ok(self.transform(input_value.clamp(INPUT_MIN, INPUT_MAX)))
            }
            InputPolicy::Reject => self.transform_checked(input_value),
        }
    }
}
