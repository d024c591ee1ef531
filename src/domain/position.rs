//! Open position state and closed trade records.
//!
//! LONG and SHORT share one code path: every price comparison and P&L term
//! is multiplied by [`Direction::sign`].

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::fmt;

use super::bar::Bar;
use super::config::TrailingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for LONG, -1 for SHORT.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    /// Price the position profits from: high for LONG, low for SHORT.
    pub fn favorable_extreme(self, bar: &Bar) -> f64 {
        match self {
            Direction::Long => bar.high,
            Direction::Short => bar.low,
        }
    }

    /// Price the position loses on: low for LONG, high for SHORT.
    pub fn adverse_extreme(self, bar: &Bar) -> f64 {
        match self {
            Direction::Long => bar.low,
            Direction::Short => bar.high,
        }
    }

    /// True when `price` is at or beyond `level` on the losing side.
    pub fn breaches_adverse(self, price: f64, level: f64) -> bool {
        self.sign() * (price - level) <= 0.0
    }

    /// True when `price` is at or beyond `level` on the winning side.
    pub fn reaches_favorable(self, price: f64, level: f64) -> bool {
        self.sign() * (price - level) >= 0.0
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrailingState {
    pub active: bool,
    pub trail_price: Option<f64>,
    /// Best excursion seen so far, as a fraction of entry (0.015 = 1.5%).
    pub max_favorable_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub direction: Direction,
    pub entry_index: usize,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub trailing: TrailingState,
}

impl Position {
    /// Opens at the bar close with stop and target placed `sl_pct` /
    /// `target_pct` percent away on the losing / winning side.
    pub fn open(
        direction: Direction,
        entry_index: usize,
        entry_price: f64,
        sl_pct: f64,
        target_pct: f64,
    ) -> Self {
        let sign = direction.sign();
        Position {
            direction,
            entry_index,
            entry_price,
            stop_loss: entry_price * (1.0 - sign * sl_pct / 100.0),
            target: entry_price * (1.0 + sign * target_pct / 100.0),
            trailing: TrailingState::default(),
        }
    }

    /// Favorable excursion of `price` relative to entry, as a fraction.
    pub fn excursion(&self, price: f64) -> f64 {
        self.direction.sign() * (price - self.entry_price) / self.entry_price
    }

    /// Updates the running maximum excursion from the bar's favorable
    /// extreme, activating the trail once `trigger_pct` is met and then only
    /// ever tightening it.
    pub fn update_trailing(&mut self, bar: &Bar, trailing: &TrailingConfig) {
        let extreme = self.direction.favorable_extreme(bar);
        let excursion = self.excursion(extreme);
        if excursion <= self.trailing.max_favorable_pct {
            return;
        }
        self.trailing.max_favorable_pct = excursion;

        let candidate = extreme * (1.0 - self.direction.sign() * trailing.lock_pct / 100.0);
        if !self.trailing.active {
            if excursion >= trailing.trigger_pct / 100.0 {
                self.trailing.active = true;
                self.trailing.trail_price = Some(candidate);
            }
        } else if let Some(current) = self.trailing.trail_price {
            if self.direction.sign() * (candidate - current) > 0.0 {
                self.trailing.trail_price = Some(candidate);
            }
        }
    }

    /// Active trail price, if the trail has been triggered.
    pub fn active_trail(&self) -> Option<f64> {
        if self.trailing.active {
            self.trailing.trail_price
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TrailingStop,
    Target,
    SessionEnd,
    EndOfData,
}

impl ExitReason {
    pub const ALL: [ExitReason; 5] = [
        ExitReason::StopLoss,
        ExitReason::TrailingStop,
        ExitReason::Target,
        ExitReason::SessionEnd,
        ExitReason::EndOfData,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::StopLoss => "stop_loss",
            ExitReason::TrailingStop => "trailing_stop",
            ExitReason::Target => "target",
            ExitReason::SessionEnd => "session_end",
            ExitReason::EndOfData => "end_of_data",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recovered per-trade simulation failure. The trade is still recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeWarning {
    /// No exit rule fired before the last bar; flattened at its close.
    StreamExhausted,
    /// Entry was on the last bar; flattened at the entry bar's own close.
    NoBarsAfterEntry,
}

impl fmt::Display for TradeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeWarning::StreamExhausted => write!(f, "stream_exhausted"),
            TradeWarning::NoBarsAfterEntry => write!(f, "no_bars_after_entry"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedTrade {
    pub direction: Direction,
    pub entry_date: NaiveDate,
    pub entry_time: NaiveTime,
    pub exit_date: NaiveDate,
    pub exit_time: NaiveTime,
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_price_adj: f64,
    pub exit_price_adj: f64,
    pub stop_loss: f64,
    pub target: f64,
    /// Trail price at close, only when the trail was active.
    pub trail_price: Option<f64>,
    pub exit_reason: ExitReason,
    pub gross_pnl: f64,
    pub brokerage: f64,
    pub tax: f64,
    pub net_pnl: f64,
    /// Best favorable excursion during the trade, in percent.
    pub max_favorable_pct: f64,
    pub position_size: u32,
    pub warning: Option<TradeWarning>,
}

impl ClosedTrade {
    pub fn is_win(&self) -> bool {
        self.net_pnl > 0.0
    }
}
