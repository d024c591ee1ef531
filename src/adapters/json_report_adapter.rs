//! JSON result adapter implementing ReportPort.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TradesimError;
use crate::ports::report_port::ReportPort;

/// Writes `{ summary, trade_log, equity_curve, stats }` as pretty JSON.
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn to_writer<W: std::io::Write>(
        result: &BacktestResult,
        mut writer: W,
    ) -> Result<(), TradesimError> {
        serde_json::to_writer_pretty(&mut writer, result).map_err(|e| TradesimError::Report {
            reason: format!("failed to serialize result: {e}"),
        })?;
        writeln!(writer).map_err(|e| TradesimError::Report {
            reason: format!("failed to write result: {e}"),
        })
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), TradesimError> {
        let file = std::fs::File::create(output_path).map_err(|e| TradesimError::Report {
            reason: format!("failed to create {}: {e}", output_path.display()),
        })?;
        Self::to_writer(result, std::io::BufWriter::new(file))
    }
}
