//! Trade log CSV adapter implementing ReportPort.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TradesimError;
use crate::ports::report_port::ReportPort;

/// Column order of `ClosedTrade` as serialized.
const HEADER: [&str; 22] = [
    "direction",
    "entry_date",
    "entry_time",
    "exit_date",
    "exit_time",
    "entry_index",
    "exit_index",
    "entry_price",
    "exit_price",
    "entry_price_adj",
    "exit_price_adj",
    "stop_loss",
    "target",
    "trail_price",
    "exit_reason",
    "gross_pnl",
    "brokerage",
    "tax",
    "net_pnl",
    "max_favorable_pct",
    "position_size",
    "warning",
];

/// Writes a header row, then one row per closed trade. An empty log still
/// gets the header.
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn to_writer<W: std::io::Write>(
        result: &BacktestResult,
        writer: W,
    ) -> Result<(), TradesimError> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        wtr.write_record(HEADER).map_err(|e| TradesimError::Report {
            reason: format!("failed to write header: {e}"),
        })?;
        for trade in &result.trade_log {
            wtr.serialize(trade).map_err(|e| TradesimError::Report {
                reason: format!("failed to write trade row: {e}"),
            })?;
        }
        wtr.flush().map_err(|e| TradesimError::Report {
            reason: format!("failed to flush trade log: {e}"),
        })
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), TradesimError> {
        let file = std::fs::File::create(output_path).map_err(|e| TradesimError::Report {
            reason: format!("failed to create {}: {e}", output_path.display()),
        })?;
        Self::to_writer(result, file)
    }
}
