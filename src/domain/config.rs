//! Simulation parameters.
//!
//! Every field carries its default from construction; nothing is resolved
//! lazily during a run. Percentages are in percent units (2.0 means 2%).

use chrono::NaiveTime;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReentryMode {
    Immediate,
    Delayed,
}

impl FromStr for ReentryMode {
    type Err = ConfigError;

    /// Accepts `IMMEDIATE`/`DELAYED` in any case, optionally prefixed `RE-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("RE-").unwrap_or(&upper);
        match name {
            "IMMEDIATE" => Ok(ReentryMode::Immediate),
            "DELAYED" => Ok(ReentryMode::Delayed),
            _ => Err(ConfigError::InvalidReentryMode(s.to_string())),
        }
    }
}

impl fmt::Display for ReentryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReentryMode::Immediate => write!(f, "IMMEDIATE"),
            ReentryMode::Delayed => write!(f, "DELAYED"),
        }
    }
}

/// Trailing stop parameters. Only exists when both values are configured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrailingConfig {
    pub trigger_pct: f64,
    pub lock_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationConfig {
    pub sl_pct: f64,
    pub target_pct: f64,
    pub trailing: Option<TrailingConfig>,
    pub reentry_count: u32,
    pub reentry_mode: Option<ReentryMode>,
    pub reentry_delay: Option<usize>,
    pub position_size: u32,
    pub slippage: f64,
    pub brokerage: f64,
    pub tax_rate: f64,
    pub max_loss_per_day: f64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Reference capital for `total_return_pct`; not used by the simulation.
    pub initial_capital: f64,
}

pub const DEFAULT_SL_PCT: f64 = 2.0;
pub const DEFAULT_TARGET_PCT: f64 = 4.0;
pub const DEFAULT_POSITION_SIZE: u32 = 100;
pub const DEFAULT_SLIPPAGE: f64 = 0.5;
pub const DEFAULT_BROKERAGE: f64 = 20.0;
pub const DEFAULT_TAX_RATE: f64 = 15.0;
pub const DEFAULT_MAX_LOSS_PER_DAY: f64 = 5000.0;
pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

pub fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 15, 0).unwrap_or(NaiveTime::MIN)
}

pub fn default_end_time() -> NaiveTime {
    NaiveTime::from_hms_opt(15, 15, 0).unwrap_or(NaiveTime::MIN)
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            sl_pct: DEFAULT_SL_PCT,
            target_pct: DEFAULT_TARGET_PCT,
            trailing: None,
            reentry_count: 0,
            reentry_mode: None,
            reentry_delay: None,
            position_size: DEFAULT_POSITION_SIZE,
            slippage: DEFAULT_SLIPPAGE,
            brokerage: DEFAULT_BROKERAGE,
            tax_rate: DEFAULT_TAX_RATE,
            max_loss_per_day: DEFAULT_MAX_LOSS_PER_DAY,
            start_time: default_start_time(),
            end_time: default_end_time(),
            initial_capital: DEFAULT_INITIAL_CAPITAL,
        }
    }
}

impl SimulationConfig {
    /// Pairs the two optional trailing values. Exactly one present is an error.
    pub fn trailing_from(
        trigger_pct: Option<f64>,
        lock_pct: Option<f64>,
    ) -> Result<Option<TrailingConfig>, ConfigError> {
        match (trigger_pct, lock_pct) {
            (None, None) => Ok(None),
            (Some(trigger_pct), Some(lock_pct)) => Ok(Some(TrailingConfig {
                trigger_pct,
                lock_pct,
            })),
            (Some(_), None) => Err(ConfigError::MismatchedTrailing {
                missing: "trail_lock_pct",
            }),
            (None, Some(_)) => Err(ConfigError::MismatchedTrailing {
                missing: "trail_trigger_pct",
            }),
        }
    }

    /// Maximum entries per (date, direction). The first entry is always
    /// admitted, so a configured count of 0 behaves as 1.
    pub fn max_entries_per_key(&self) -> u32 {
        self.reentry_count.max(1)
    }

    /// Bars to wait before a delayed re-entry.
    pub fn reentry_step(&self) -> usize {
        self.reentry_delay.unwrap_or(1)
    }
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}
