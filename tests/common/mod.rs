#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};
pub use tradesim::domain::bar::Bar;
pub use tradesim::domain::config::SimulationConfig;
use tradesim::domain::error::TradesimError;
use tradesim::ports::data_port::DataPort;

pub struct MockDataPort {
    pub bars: Vec<Bar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars, error: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn load_bars(&self) -> Result<Vec<Bar>, TradesimError> {
        if let Some(reason) = &self.error {
            return Err(TradesimError::Csv {
                reason: reason.clone(),
            });
        }
        Ok(self.bars.clone())
    }
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

pub fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Bar with open equal to close.
pub fn make_bar(
    date: NaiveDate,
    time: NaiveTime,
    high: f64,
    low: f64,
    close: f64,
    fast_avg: f64,
    oscillator: f64,
) -> Bar {
    Bar {
        date,
        time,
        open: close,
        high,
        low,
        close,
        fast_avg: Some(fast_avg),
        oscillator: Some(oscillator),
    }
}

/// Bar that produces no signal: oscillator sits at 50.
pub fn quiet_bar(date: NaiveDate, time: NaiveTime, high: f64, low: f64, close: f64) -> Bar {
    make_bar(date, time, high, low, close, close, 50.0)
}

/// Bar that produces a LONG candidate at `close`.
pub fn long_bar(date: NaiveDate, time: NaiveTime, close: f64) -> Bar {
    make_bar(date, time, close, close, close, close - 1.0, 60.0)
}

/// Bar that produces a SHORT candidate at `close`.
pub fn short_bar(date: NaiveDate, time: NaiveTime, close: f64) -> Bar {
    make_bar(date, time, close, close, close, close + 1.0, 40.0)
}

/// 2% stop, 4% target, no trading costs, one unit.
pub fn frictionless_config() -> SimulationConfig {
    SimulationConfig {
        sl_pct: 2.0,
        target_pct: 4.0,
        position_size: 1,
        slippage: 0.0,
        brokerage: 0.0,
        tax_rate: 0.0,
        ..SimulationConfig::default()
    }
}
