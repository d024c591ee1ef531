//! Summary statistics over the trade log and equity curve.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use super::position::{ClosedTrade, ExitReason};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// |sum(wins) / sum(losses)|, or `Infinite` when nothing was lost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfitFactor {
    Finite(f64),
    Infinite,
}

impl ProfitFactor {
    pub fn is_infinite(self) -> bool {
        matches!(self, ProfitFactor::Infinite)
    }
}

impl fmt::Display for ProfitFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfitFactor::Finite(v) => write!(f, "{v:.2}"),
            ProfitFactor::Infinite => write!(f, "inf"),
        }
    }
}

impl Serialize for ProfitFactor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ProfitFactor::Finite(v) => serializer.serialize_f64(*v),
            ProfitFactor::Infinite => serializer.serialize_str("inf"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_pnl: f64,
    pub num_trades: usize,
    pub num_wins: usize,
    pub num_losses: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    /// Lowest point of the equity curve.
    pub max_drawdown: f64,
    pub profit_factor: ProfitFactor,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub sharpe_ratio: f64,
    pub total_return_pct: f64,
    /// Trades flattened because the bar stream ran out.
    pub warnings: usize,
    pub exit_reasons: BTreeMap<ExitReason, usize>,
}

impl Summary {
    pub fn compute(trades: &[ClosedTrade], equity_curve: &[f64], initial_capital: f64) -> Self {
        let total_pnl = equity_curve.last().copied().unwrap_or(0.0);

        let mut num_wins = 0usize;
        let mut num_losses = 0usize;
        let mut sum_wins = 0.0_f64;
        let mut sum_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut win_streak = 0usize;
        let mut loss_streak = 0usize;
        let mut max_consecutive_wins = 0usize;
        let mut max_consecutive_losses = 0usize;
        let mut warnings = 0usize;
        let mut exit_reasons: BTreeMap<ExitReason, usize> =
            ExitReason::ALL.iter().map(|r| (*r, 0)).collect();

        for trade in trades {
            let pnl = trade.net_pnl;
            if trade.is_win() {
                num_wins += 1;
                sum_wins += pnl;
                largest_win = largest_win.max(pnl);
                win_streak += 1;
                loss_streak = 0;
                max_consecutive_wins = max_consecutive_wins.max(win_streak);
            } else {
                num_losses += 1;
                sum_losses += pnl;
                largest_loss = largest_loss.min(pnl);
                loss_streak += 1;
                win_streak = 0;
                max_consecutive_losses = max_consecutive_losses.max(loss_streak);
            }

            if trade.warning.is_some() {
                warnings += 1;
            }
            *exit_reasons.entry(trade.exit_reason).or_insert(0) += 1;
        }

        let num_trades = trades.len();
        let win_rate = if num_trades > 0 {
            num_wins as f64 / num_trades as f64
        } else {
            0.0
        };
        let avg_win = if num_wins > 0 {
            sum_wins / num_wins as f64
        } else {
            0.0
        };
        let avg_loss = if num_losses > 0 {
            sum_losses / num_losses as f64
        } else {
            0.0
        };

        let max_drawdown = equity_curve
            .iter()
            .copied()
            .reduce(f64::min)
            .unwrap_or(0.0);

        let total_return_pct = if initial_capital > 0.0 {
            total_pnl / initial_capital * 100.0
        } else {
            0.0
        };

        Summary {
            total_pnl,
            num_trades,
            num_wins,
            num_losses,
            win_rate,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            max_drawdown,
            profit_factor: compute_profit_factor(num_wins, sum_wins, sum_losses),
            max_consecutive_wins,
            max_consecutive_losses,
            sharpe_ratio: compute_sharpe(equity_curve),
            total_return_pct,
            warnings,
            exit_reasons,
        }
    }
}

fn compute_profit_factor(num_wins: usize, sum_wins: f64, sum_losses: f64) -> ProfitFactor {
    if num_wins == 0 {
        return ProfitFactor::Finite(0.0);
    }
    if sum_losses == 0.0 {
        return ProfitFactor::Infinite;
    }
    ProfitFactor::Finite((sum_wins / sum_losses).abs())
}

/// Mean over population stddev of successive equity differences, annualised
/// with sqrt(252).
fn compute_sharpe(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let diffs: Vec<f64> = equity_curve.windows(2).map(|w| w[1] - w[0]).collect();
    let n = diffs.len() as f64;
    let mean = diffs.iter().sum::<f64>() / n;
    let variance = diffs.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        mean / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
