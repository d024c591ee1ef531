//! Backtest run loop.
//!
//! For each bar inside the session window the signal evaluator proposes up to
//! two candidates. Each admitted candidate is simulated to its exit, costed,
//! and recorded only if the daily loss gate accepts it. The run is a pure
//! function of (bars, config).

use chrono::NaiveTime;
use serde::Serialize;
use tracing::{debug, info};

use super::bar::{Bar, validate_bars};
use super::config::SimulationConfig;
use super::config_validation::validate_simulation_config;
use super::cost::CostModel;
use super::error::TradesimError;
use super::metrics::Summary;
use super::position::ClosedTrade;
use super::reentry::ReentryTracker;
use super::risk::DailyLedger;
use super::signal;
use super::simulator::{SimulatedTrade, simulate_trade};

/// Candidate bookkeeping for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub bars: usize,
    pub candidates: usize,
    pub rejected_reentry: usize,
    pub rejected_daily_loss: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub summary: Summary,
    pub trade_log: Vec<ClosedTrade>,
    /// Running balance after each accepted trade, starting from zero.
    pub equity_curve: Vec<f64>,
    pub stats: RunStats,
}

pub fn run_backtest(bars: &[Bar], config: &SimulationConfig) -> Result<BacktestResult, TradesimError> {
    validate_simulation_config(config)?;
    validate_bars(bars)?;

    info!(
        bars = bars.len(),
        first = %bars[0].date,
        last = %bars[bars.len() - 1].date,
        "starting backtest"
    );

    let costs = CostModel::from_config(config);
    let mut reentry = ReentryTracker::new();
    let mut ledger = DailyLedger::new();
    let mut trade_log = Vec::new();
    let mut equity_curve = Vec::new();
    let mut balance = 0.0;
    let mut stats = RunStats {
        bars: bars.len(),
        ..RunStats::default()
    };

    for (index, bar) in bars.iter().enumerate() {
        if !in_session(bar.time, config) {
            continue;
        }

        for direction in signal::evaluate(bar).candidates() {
            stats.candidates += 1;

            if !reentry.admit(bar.date, direction, index, config) {
                stats.rejected_reentry += 1;
                debug!(index, %direction, date = %bar.date, "re-entry refused");
                continue;
            }

            let simulated = simulate_trade(bars, index, direction, config);
            let trade = close_trade(bars, simulated, &costs);

            if !ledger.accept(bar.date, trade.net_pnl, config.max_loss_per_day) {
                stats.rejected_daily_loss += 1;
                debug!(
                    index,
                    %direction,
                    net_pnl = trade.net_pnl,
                    day_total = ledger.total(bar.date),
                    "trade discarded by daily loss limit"
                );
                continue;
            }

            balance += trade.net_pnl;
            debug!(
                index,
                %direction,
                exit_reason = %trade.exit_reason,
                net_pnl = trade.net_pnl,
                balance,
                "trade recorded"
            );
            equity_curve.push(balance);
            trade_log.push(trade);
        }
    }

    let summary = Summary::compute(&trade_log, &equity_curve, config.initial_capital);

    info!(
        trades = trade_log.len(),
        candidates = stats.candidates,
        rejected_reentry = stats.rejected_reentry,
        rejected_daily_loss = stats.rejected_daily_loss,
        total_pnl = summary.total_pnl,
        "backtest complete"
    );

    Ok(BacktestResult {
        summary,
        trade_log,
        equity_curve,
        stats,
    })
}

/// Entries are only taken on bars inside [start_time, end_time].
pub fn in_session(time: NaiveTime, config: &SimulationConfig) -> bool {
    time >= config.start_time && time <= config.end_time
}

fn close_trade(bars: &[Bar], simulated: SimulatedTrade, costs: &CostModel) -> ClosedTrade {
    let SimulatedTrade {
        position,
        exit_index,
        exit_price,
        exit_reason,
        warning,
    } = simulated;
    let entry_bar = &bars[position.entry_index];
    let exit_bar = &bars[exit_index];
    let applied = costs.apply(position.direction, position.entry_price, exit_price);

    ClosedTrade {
        direction: position.direction,
        entry_date: entry_bar.date,
        entry_time: entry_bar.time,
        exit_date: exit_bar.date,
        exit_time: exit_bar.time,
        entry_index: position.entry_index,
        exit_index,
        entry_price: position.entry_price,
        exit_price,
        entry_price_adj: applied.entry_price_adj,
        exit_price_adj: applied.exit_price_adj,
        stop_loss: position.stop_loss,
        target: position.target,
        trail_price: position.active_trail(),
        exit_reason,
        gross_pnl: applied.gross_pnl,
        brokerage: applied.brokerage,
        tax: applied.tax,
        net_pnl: applied.net_pnl,
        max_favorable_pct: position.trailing.max_favorable_pct * 100.0,
        position_size: costs.position_size,
        warning,
    }
}
