//! Configuration for HandBand.

use crate::core::{EngineConfig, InputPolicy};
use crate::sensor::{BiosensorConfig, SensorType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default refresh interval of the display harness.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// EMOTE engine settings
    pub engine: EngineConfig,

    /// How often the harness polls the sensor
    #[serde(with = "duration_millis_serde")]
    pub poll_interval: Duration,

    /// Treatment of input outside [-1, 1]
    pub input_policy: InputPolicy,

    /// Which sensor drives the harness
    pub sensor: SensorType,

    /// Settings used when the sensor is a biosensor
    pub biosensor: BiosensorConfig,

    /// Debug panels shown by the harness
    pub panels: PanelConfig,

    /// Path for storing session statistics
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("handband");

        Self {
            engine: EngineConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            input_policy: InputPolicy::default(),
            sensor: SensorType::ManualSlider,
            biosensor: BiosensorConfig::default(),
            panels: PanelConfig::default(),
            data_path: data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, falling back to defaults when
    /// the file does not exist.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("handband")
            .join("config.json")
    }

    /// Store a new arousal exponent in the default configuration file.
    pub fn set_arousal_exponent(exponent: f64) -> Result<Self, ConfigError> {
        Self::set_arousal_exponent_at(&Self::config_path(), exponent)
    }

    /// Store a new arousal exponent in `path`, keeping every other setting.
    ///
    /// A file that cannot be read, parsed or validated is left untouched.
    pub fn set_arousal_exponent_at(
        path: &std::path::Path,
        exponent: f64,
    ) -> Result<Self, ConfigError> {
        let engine = EngineConfig::with_exponent(exponent);
        engine
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let mut config = Self::load_from(path)?;
        config.engine = engine;
        config.save_to(path)?;
        Ok(config)
    }

    /// Path of the persisted session statistics.
    pub fn stats_path(&self) -> PathBuf {
        self.data_path.join("stats.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        if self.sensor == SensorType::Biosensor {
            self.biosensor
                .range
                .validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }

        if !self.panels.any_enabled() {
            return Err(ConfigError::Invalid("no debug panel is enabled".to_string()));
        }

        Ok(())
    }
}

/// Debug panels rendered by the harness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Show the raw input value
    pub show_input: bool,
    /// Title of the input panel
    pub input_title: String,
    /// Show the EMOTE valence/arousal values
    pub show_emote: bool,
    /// Title of the EMOTE panel
    pub emote_title: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            show_input: true,
            input_title: "Input Values Test".to_string(),
            show_emote: true,
            emote_title: "EMOTE Values Test".to_string(),
        }
    }
}

impl PanelConfig {
    /// Check if at least one panel is shown.
    pub fn any_enabled(&self) -> bool {
        self.show_input || self.show_emote
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration as whole milliseconds.
mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::RawRange;

    fn temp_config_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("handband-config-{}", uuid::Uuid::new_v4()))
            .join("config.json")
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine.arousal_exponent, 2.0);
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.input_policy, InputPolicy::PassThrough);
        assert_eq!(config.sensor, SensorType::ManualSlider);
        assert!(config.panels.any_enabled());
        assert_eq!(config.panels.input_title, "Input Values Test");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_config_path();
        let mut config = Config::default();
        config.engine = EngineConfig::with_exponent(3.0);
        config.poll_interval = Duration::from_millis(50);
        config.input_policy = InputPolicy::Clamp;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.engine.arousal_exponent, 3.0);
        assert_eq!(loaded.poll_interval, Duration::from_millis(50));
        assert_eq!(loaded.input_policy, InputPolicy::Clamp);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let loaded = Config::load_from(&temp_config_path()).unwrap();
        assert_eq!(loaded.engine.arousal_exponent, 2.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.engine = EngineConfig::with_exponent(0.0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sensor = SensorType::Biosensor;
        config.biosensor.range = RawRange::new(1.0, 0.0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.panels.show_input = false;
        assert!(config.validate().is_ok());
        config.panels.show_emote = false;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_set_exponent_keeps_other_settings() {
        let path = temp_config_path();
        let mut config = Config::default();
        config.poll_interval = Duration::from_millis(250);
        config.input_policy = InputPolicy::Clamp;
        config.panels.emote_title = "Affect".to_string();
        config.save_to(&path).unwrap();

        let updated = Config::set_arousal_exponent_at(&path, 3.5).unwrap();
        assert_eq!(updated.engine.arousal_exponent, 3.5);

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.engine.arousal_exponent, 3.5);
        assert_eq!(loaded.poll_interval, Duration::from_millis(250));
        assert_eq!(loaded.input_policy, InputPolicy::Clamp);
        assert_eq!(loaded.panels.emote_title, "Affect");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_set_exponent_without_file_starts_from_defaults() {
        let path = temp_config_path();

        Config::set_arousal_exponent_at(&path, 1.5).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.engine.arousal_exponent, 1.5);
        assert_eq!(loaded.poll_interval, DEFAULT_POLL_INTERVAL);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_set_exponent_leaves_unreadable_file_alone() {
        let path = temp_config_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Config::set_arousal_exponent_at(&path, 3.0),
            Err(ConfigError::ParseError(_))
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");

        assert!(matches!(
            Config::set_arousal_exponent_at(&path, -1.0),
            Err(ConfigError::Invalid(_))
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_invalid_file_is_a_parse_error() {
        let path = temp_config_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Config::load_from(&path), Err(ConfigError::ParseError(_))));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
