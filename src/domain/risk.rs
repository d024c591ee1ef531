//! Daily loss gate.
//!
//! Decides whether an already simulated trade is recorded. It does not limit
//! exposure while the trade is open.

use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct DailyLedger {
    totals: HashMap<NaiveDate, f64>,
}

impl DailyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts the trade unless it would take the day's running total below
    /// `-max_loss_per_day`. A rejected trade leaves the ledger untouched.
    pub fn accept(&mut self, date: NaiveDate, net_pnl: f64, max_loss_per_day: f64) -> bool {
        let projected = self.total(date) + net_pnl;
        if projected < -max_loss_per_day {
            return false;
        }
        self.totals.insert(date, projected);
        true
    }

    pub fn total(&self, date: NaiveDate) -> f64 {
        self.totals.get(&date).copied().unwrap_or(0.0)
    }
}
