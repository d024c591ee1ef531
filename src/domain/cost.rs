//! Trading cost model.
//!
//! Slippage moves both legs against the trader by a flat price amount.
//! gross = sign * (exit_adj - entry_adj) * size
//! tax   = tax_rate / 100 * max(0, gross)
//! net   = gross - 2 * brokerage - tax

use super::config::SimulationConfig;
use super::position::Direction;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub slippage: f64,
    pub brokerage: f64,
    pub tax_rate: f64,
    pub position_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeCosts {
    pub entry_price_adj: f64,
    pub exit_price_adj: f64,
    pub gross_pnl: f64,
    /// Per-leg brokerage; charged twice in `net_pnl`.
    pub brokerage: f64,
    pub tax: f64,
    pub net_pnl: f64,
}

impl CostModel {
    pub fn from_config(config: &SimulationConfig) -> Self {
        CostModel {
            slippage: config.slippage,
            brokerage: config.brokerage,
            tax_rate: config.tax_rate,
            position_size: config.position_size,
        }
    }

    pub fn apply(&self, direction: Direction, entry_price: f64, exit_price: f64) -> TradeCosts {
        let sign = direction.sign();
        let entry_price_adj = entry_price + sign * self.slippage;
        let exit_price_adj = exit_price - sign * self.slippage;
        let gross_pnl = sign * (exit_price_adj - entry_price_adj) * self.position_size as f64;
        let tax = self.tax_rate / 100.0 * gross_pnl.max(0.0);
        let net_pnl = gross_pnl - 2.0 * self.brokerage - tax;

        TradeCosts {
            entry_price_adj,
            exit_price_adj,
            gross_pnl,
            brokerage: self.brokerage,
            tax,
            net_pnl,
        }
    }
}
