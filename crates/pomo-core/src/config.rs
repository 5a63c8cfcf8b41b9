//! TOML-based application configuration.
//!
//! Stores the defaults for the command-line flags:
//! - Round count and phase lengths
//! - Auto-progress and time unit
//! - Driver tick interval
//!
//! Configuration is stored at `~/.config/pomo/config.toml`. Command-line
//! flags always win over the file.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::timer::{SessionConfig, TimeUnit};

/// Phase lengths and progression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    #[serde(default = "default_focus")]
    pub focus: u32,
    #[serde(default = "default_short")]
    pub short: u32,
    #[serde(default = "default_long")]
    pub long: u32,
    #[serde(default)]
    pub auto: bool,
    /// Interpret durations as seconds instead of minutes.
    #[serde(default)]
    pub seconds: bool,
}

/// Event loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pomo/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub driver: DriverConfig,
}

// Default functions
fn default_rounds() -> u32 {
    3
}
fn default_focus() -> u32 {
    25
}
fn default_short() -> u32 {
    5
}
fn default_long() -> u32 {
    15
}
fn default_tick_ms() -> u64 {
    1_000
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            focus: default_focus(),
            short: default_short(),
            long: default_long(),
            auto: false,
            seconds: false,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

/// Returns `~/.config/pomo[-dev]/` based on POMO_ENV.
///
/// Set POMO_ENV=dev to use the development directory.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .ok_or(ConfigError::NoConfigDir)?
        .join(".config");

    let env = std::env::var("POMO_ENV").unwrap_or_else(|_| "production".to_string());

    Ok(if env == "dev" {
        base_dir.join("pomo-dev")
    } else {
        base_dir.join("pomo")
    })
}

impl Config {
    /// Default location of the config file.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from `path`. A missing file yields the defaults; an unreadable
    /// or malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Persist to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };

        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Validate and convert the timer section.
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let rounds = NonZeroU32::new(self.timer.rounds).ok_or_else(|| ConfigError::InvalidValue {
            key: "timer.rounds".into(),
            message: "must be at least 1".into(),
        })?;

        Ok(SessionConfig {
            rounds,
            short: self.timer.short,
            long: self.timer.long,
            focus: self.timer.focus,
            auto: self.timer.auto,
            unit: TimeUnit::from_seconds_flag(self.timer.seconds),
        })
    }

    pub fn tick_interval(&self) -> Result<Duration, ConfigError> {
        if self.driver.tick_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "driver.tick_ms".into(),
                message: "must be greater than 0".into(),
            });
        }
        Ok(Duration::from_millis(self.driver.tick_ms))
    }
}
