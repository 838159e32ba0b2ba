//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `greenhouse.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use greenhouse_app::decay_scheduler::DecaySettings;
use greenhouse_app::engine::EngineSettings;
use greenhouse_app::robot::RobotSettings;
use greenhouse_domain::zone::Zone;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Multiplier applied to every simulated duration (`0.1` runs ten times faster).
    pub time_scale: f64,
    /// Robot identity and operation timings.
    pub robot: RobotConfig,
    /// Effect decay timings.
    pub decay: DecayConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Demo sequence and status reporting.
    pub demo: DemoConfig,
}

/// Robot configuration. Durations in milliseconds unless noted.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub id: String,
    /// Zone the robot starts in (`A`..`D`).
    pub start_zone: String,
    pub move_ms: u32,
    pub water_ms: u32,
    pub manure_ms: u32,
    pub fertilizer_ms: u32,
    pub charge_ms: u32,
    /// Seconds between two battery drain ticks.
    pub battery_tick_secs: f64,
}

/// Decay configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    pub grace_secs: f64,
    pub interval_secs: f64,
    pub step: u8,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Run the scripted demo sequence at startup.
    pub enabled: bool,
    /// Seconds between two status log lines (not scaled).
    pub status_interval_secs: f64,
}

impl Config {
    /// Load configuration from `greenhouse.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting values are out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("greenhouse.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("GREENHOUSE_ROBOT_ID") {
            self.robot.id = val;
        }
        if let Some(scale) = lookup("GREENHOUSE_TIME_SCALE").and_then(|val| val.parse().ok()) {
            self.time_scale = scale;
        }
        if let Some(val) = lookup("GREENHOUSE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return Err(ConfigError::Validation(
                "time_scale must be a positive number".to_string(),
            ));
        }
        self.start_zone()?;
        if self.decay.step == 0 {
            return Err(ConfigError::Validation(
                "decay step must be non-zero".to_string(),
            ));
        }
        for (name, secs) in [
            ("decay.interval_secs", self.decay.interval_secs),
            ("robot.battery_tick_secs", self.robot.battery_tick_secs),
            ("demo.status_interval_secs", self.demo.status_interval_secs),
        ] {
            if !(secs.is_finite() && secs > 0.0) {
                return Err(ConfigError::Validation(format!("{name} must be positive")));
            }
        }
        if !(self.decay.grace_secs.is_finite() && self.decay.grace_secs >= 0.0) {
            return Err(ConfigError::Validation(
                "decay.grace_secs must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    fn start_zone(&self) -> Result<Zone, ConfigError> {
        self.robot.start_zone.parse().map_err(|_| {
            ConfigError::Validation(format!("unknown start zone {}", self.robot.start_zone))
        })
    }

    fn scaled(&self, secs: f64) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(secs * self.time_scale)
            .map_err(|err| ConfigError::Validation(format!("duration out of range: {err}")))
    }

    fn scaled_ms(&self, ms: u32) -> Result<Duration, ConfigError> {
        self.scaled(f64::from(ms) / 1000.0)
    }

    /// Translate into the simulation core's settings, applying `time_scale`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if a value cannot be represented.
    pub fn engine_settings(&self) -> Result<EngineSettings, ConfigError> {
        let robot = RobotSettings {
            id: self.robot.id.clone(),
            start_zone: self.start_zone()?,
            move_duration: self.scaled_ms(self.robot.move_ms)?,
            water_duration: self.scaled_ms(self.robot.water_ms)?,
            manure_duration: self.scaled_ms(self.robot.manure_ms)?,
            fertilizer_duration: self.scaled_ms(self.robot.fertilizer_ms)?,
            charge_duration: self.scaled_ms(self.robot.charge_ms)?,
            battery_tick: self.scaled(self.robot.battery_tick_secs)?,
        };
        let decay = DecaySettings {
            grace: self.scaled(self.decay.grace_secs)?,
            interval: self.scaled(self.decay.interval_secs)?,
            step: self.decay.step,
        };

        Ok(EngineSettings {
            robot,
            decay,
            ..EngineSettings::default()
        })
    }

    /// How often the status line is logged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the value cannot be represented.
    pub fn status_interval(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.demo.status_interval_secs)
            .map_err(|err| ConfigError::Validation(format!("status interval out of range: {err}")))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            robot: RobotConfig::default(),
            decay: DecayConfig::default(),
            logging: LoggingConfig::default(),
            demo: DemoConfig::default(),
        }
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            id: "rx200_001".to_string(),
            start_zone: "A".to_string(),
            move_ms: 200,
            water_ms: 300,
            manure_ms: 400,
            fertilizer_ms: 300,
            charge_ms: 500,
            battery_tick_secs: 10.0,
        }
    }
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            grace_secs: 30.0,
            interval_secs: 5.0,
            step: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "greenhoused=info,greenhouse_app=info,greenhouse_adapter_virtual=info"
                .to_string(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            status_interval_secs: 15.0,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
