//! Single-position simulation.
//!
//! A position opens at the candidate bar's close and is resolved within one
//! forward scan. Per bar, in this order, first match wins:
//!
//! 1. trailing update (if configured)
//! 2. stop-loss at `stop_loss`
//! 3. trailing stop at `trail_price` (if active)
//! 4. target at `target`
//! 5. session end at the bar's close
//!
//! A scan that runs out of bars flattens at the last bar's close and marks
//! the trade with a [`TradeWarning`].

use tracing::warn;

use super::bar::Bar;
use super::config::SimulationConfig;
use super::position::{Direction, ExitReason, Position, TradeWarning};

/// Outcome of a scan before costs are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedTrade {
    /// Position state at the moment of exit.
    pub position: Position,
    pub exit_index: usize,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub warning: Option<TradeWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ScanState {
    Open,
    Closed {
        index: usize,
        price: f64,
        reason: ExitReason,
    },
}

/// Opens `direction` at `bars[entry_index].close` and scans forward to the exit.
///
/// `entry_index` must be a valid index into `bars`.
pub fn simulate_trade(
    bars: &[Bar],
    entry_index: usize,
    direction: Direction,
    config: &SimulationConfig,
) -> SimulatedTrade {
    let entry_bar = &bars[entry_index];
    let mut position = Position::open(
        direction,
        entry_index,
        entry_bar.close,
        config.sl_pct,
        config.target_pct,
    );

    let mut state = ScanState::Open;
    for (index, bar) in bars.iter().enumerate().skip(entry_index + 1) {
        state = step(&mut position, index, bar, config);
        if let ScanState::Closed { .. } = state {
            break;
        }
    }

    match state {
        ScanState::Closed {
            index,
            price,
            reason,
        } => SimulatedTrade {
            position,
            exit_index: index,
            exit_price: price,
            exit_reason: reason,
            warning: None,
        },
        ScanState::Open => flatten_at_end(bars, position),
    }
}

/// Applies the per-bar rules to an open position.
fn step(position: &mut Position, index: usize, bar: &Bar, config: &SimulationConfig) -> ScanState {
    let direction = position.direction;

    if let Some(trailing) = &config.trailing {
        position.update_trailing(bar, trailing);
    }

    let adverse = direction.adverse_extreme(bar);
    if direction.breaches_adverse(adverse, position.stop_loss) {
        return ScanState::Closed {
            index,
            price: position.stop_loss,
            reason: ExitReason::StopLoss,
        };
    }

    if let Some(trail_price) = position.active_trail() {
        if direction.breaches_adverse(adverse, trail_price) {
            return ScanState::Closed {
                index,
                price: trail_price,
                reason: ExitReason::TrailingStop,
            };
        }
    }

    if direction.reaches_favorable(direction.favorable_extreme(bar), position.target) {
        return ScanState::Closed {
            index,
            price: position.target,
            reason: ExitReason::Target,
        };
    }

    if bar.time >= config.end_time {
        return ScanState::Closed {
            index,
            price: bar.close,
            reason: ExitReason::SessionEnd,
        };
    }

    ScanState::Open
}

fn flatten_at_end(bars: &[Bar], position: Position) -> SimulatedTrade {
    let last_index = bars.len() - 1;
    let warning = if last_index > position.entry_index {
        TradeWarning::StreamExhausted
    } else {
        TradeWarning::NoBarsAfterEntry
    };
    let last = &bars[last_index];

    warn!(
        direction = %position.direction,
        entry_index = position.entry_index,
        exit_index = last_index,
        %warning,
        "position still open at end of bars, flattening at last close"
    );

    SimulatedTrade {
        position,
        exit_index: last_index,
        exit_price: last.close,
        exit_reason: ExitReason::EndOfData,
        warning: Some(warning),
    }
}
