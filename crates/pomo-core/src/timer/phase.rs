use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn is_break(self) -> bool {
        matches!(self, Phase::ShortBreak | Phase::LongBreak)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Focus => "Focus",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Granularity applied to every configured duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Seconds,
    #[default]
    Minutes,
}

impl TimeUnit {
    pub fn as_ms(self) -> u64 {
        match self {
            TimeUnit::Seconds => 1_000,
            TimeUnit::Minutes => 60_000,
        }
    }

    pub fn from_seconds_flag(seconds: bool) -> Self {
        if seconds {
            TimeUnit::Seconds
        } else {
            TimeUnit::Minutes
        }
    }
}

/// Immutable session configuration.
///
/// Durations are counts of `unit`. `rounds` is the number of focus rounds
/// per long-break cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub rounds: NonZeroU32,
    pub short: u32,
    pub long: u32,
    pub focus: u32,
    pub auto: bool,
    pub unit: TimeUnit,
}

impl SessionConfig {
    /// Configured length of `phase` in milliseconds.
    ///
    /// Uses saturating arithmetic so absurd flag values cannot overflow.
    pub fn phase_duration_ms(&self, phase: Phase) -> u64 {
        let units = match phase {
            Phase::Focus => self.focus,
            Phase::ShortBreak => self.short,
            Phase::LongBreak => self.long,
        };
        u64::from(units).saturating_mul(self.unit.as_ms())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rounds: NonZeroU32::new(3).unwrap_or(NonZeroU32::MIN),
            short: 5,
            long: 15,
            focus: 25,
            auto: false,
            unit: TimeUnit::Minutes,
        }
    }
}
