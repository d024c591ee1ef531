//! Configuration validation.
//!
//! Runs before a backtest starts; any failure aborts the run with no output.

use crate::domain::config::{ReentryMode, SimulationConfig};
use crate::domain::error::ConfigError;

const MAX_PCT: f64 = 100.0;

pub fn validate_simulation_config(config: &SimulationConfig) -> Result<(), ConfigError> {
    validate_pct("sl_pct", config.sl_pct)?;
    validate_pct("target_pct", config.target_pct)?;
    validate_trailing(config)?;
    validate_reentry(config)?;
    validate_position_size(config)?;
    validate_costs(config)?;
    validate_session(config)?;
    validate_initial_capital(config)?;
    Ok(())
}

fn validate_pct(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 || value > MAX_PCT {
        return Err(ConfigError::InvalidPercentage {
            field,
            value,
            max: MAX_PCT,
        });
    }
    Ok(())
}

fn validate_trailing(config: &SimulationConfig) -> Result<(), ConfigError> {
    if let Some(trailing) = config.trailing {
        validate_pct("trail_trigger_pct", trailing.trigger_pct)?;
        validate_pct("trail_lock_pct", trailing.lock_pct)?;
    }
    Ok(())
}

fn validate_reentry(config: &SimulationConfig) -> Result<(), ConfigError> {
    match (config.reentry_mode, config.reentry_delay) {
        (Some(ReentryMode::Delayed), None) | (Some(ReentryMode::Delayed), Some(0)) => {
            Err(ConfigError::MissingReentryDelay)
        }
        (_, Some(0)) => Err(ConfigError::InvalidValue {
            field: "reentry_delay",
            reason: "reentry_delay must be positive".into(),
        }),
        _ => Ok(()),
    }
}

fn validate_position_size(config: &SimulationConfig) -> Result<(), ConfigError> {
    if config.position_size == 0 {
        return Err(ConfigError::InvalidValue {
            field: "position_size",
            reason: "position_size must be positive".into(),
        });
    }
    Ok(())
}

fn validate_costs(config: &SimulationConfig) -> Result<(), ConfigError> {
    for (field, value) in [
        ("slippage", config.slippage),
        ("brokerage", config.brokerage),
        ("max_loss_per_day", config.max_loss_per_day),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidValue {
                field,
                reason: format!("{field} must be non-negative, got {value}"),
            });
        }
    }

    if !config.tax_rate.is_finite() || config.tax_rate < 0.0 || config.tax_rate > MAX_PCT {
        return Err(ConfigError::InvalidValue {
            field: "tax_rate",
            reason: format!("tax_rate must be between 0 and 100, got {}", config.tax_rate),
        });
    }
    Ok(())
}

fn validate_session(config: &SimulationConfig) -> Result<(), ConfigError> {
    if config.start_time > config.end_time {
        return Err(ConfigError::InvalidValue {
            field: "start_time",
            reason: format!(
                "start_time {} is after end_time {}",
                config.start_time, config.end_time
            ),
        });
    }
    Ok(())
}

fn validate_initial_capital(config: &SimulationConfig) -> Result<(), ConfigError> {
    if !config.initial_capital.is_finite() || config.initial_capital <= 0.0 {
        return Err(ConfigError::InvalidValue {
            field: "initial_capital",
            reason: "initial_capital must be positive".into(),
        });
    }
    Ok(())
}
