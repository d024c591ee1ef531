//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestResult};
use crate::domain::config::{
    DEFAULT_BROKERAGE, DEFAULT_INITIAL_CAPITAL, DEFAULT_MAX_LOSS_PER_DAY, DEFAULT_POSITION_SIZE,
    DEFAULT_SL_PCT, DEFAULT_SLIPPAGE, DEFAULT_TARGET_PCT, DEFAULT_TAX_RATE, ReentryMode,
    SimulationConfig, default_end_time, default_start_time, parse_time,
};
use crate::domain::config_validation::validate_simulation_config;
use crate::domain::error::{ConfigError, TradesimError};
use crate::domain::position::ExitReason;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const STRATEGY: &str = "strategy";
const COSTS: &str = "costs";

#[derive(Parser, Debug)]
#[command(name = "tradesim", about = "Intraday signal strategy backtester")]
pub struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over a bar CSV
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        /// Write the trade log as CSV
        #[arg(short, long)]
        trades: Option<PathBuf>,
        /// Write the full result as JSON ("-" for stdout)
        #[arg(short, long)]
        json: Option<PathBuf>,
    },
    /// Validate a configuration file and print the resolved values
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Installs the stderr log subscriber. Safe to call more than once.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            data,
            trades,
            json,
        } => run_backtest(&config, &data, trades.as_deref(), json.as_deref()),
        Command::Validate { config } => run_validate(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

pub fn load_config(path: &Path) -> Result<SimulationConfig, TradesimError> {
    eprintln!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    build_simulation_config(&adapter)
}

fn run_backtest(
    config_path: &Path,
    data_path: &Path,
    trades_path: Option<&Path>,
    json_path: Option<&Path>,
) -> Result<(), TradesimError> {
    let config = load_config(config_path)?;

    eprintln!("Loading bars from {}", data_path.display());
    let bars = CsvAdapter::new(data_path).load_bars()?;

    eprintln!("Running backtest: {} bars", bars.len());
    let result = backtest_engine::run_backtest(&bars, &config)?;

    print_summary(&result);

    if let Some(path) = trades_path {
        CsvReportAdapter.write(&result, path)?;
        eprintln!("\nTrade log written to: {}", path.display());
    }

    match json_path {
        Some(path) if path.as_os_str() == "-" => {
            JsonReportAdapter::to_writer(&result, std::io::stdout().lock())?;
        }
        Some(path) => {
            JsonReportAdapter.write(&result, path)?;
            eprintln!("Result written to: {}", path.display());
        }
        None => {}
    }

    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), TradesimError> {
    let config = load_config(config_path)?;
    validate_simulation_config(&config)?;

    eprintln!("\nConfiguration OK");
    eprintln!("  sl_pct:           {}", config.sl_pct);
    eprintln!("  target_pct:       {}", config.target_pct);
    match &config.trailing {
        Some(t) => eprintln!(
            "  trailing:         trigger {}%, lock {}%",
            t.trigger_pct, t.lock_pct
        ),
        None => eprintln!("  trailing:         off"),
    }
    eprintln!(
        "  reentry:          count {} (effective {}), mode {}",
        config.reentry_count,
        config.max_entries_per_key(),
        config
            .reentry_mode
            .map(|m| m.to_string())
            .unwrap_or_else(|| "none".into())
    );
    if let Some(delay) = config.reentry_delay {
        eprintln!("  reentry_delay:    {delay} bars");
    }
    eprintln!(
        "  session:          {} to {}",
        config.start_time.format("%H:%M:%S"),
        config.end_time.format("%H:%M:%S")
    );
    eprintln!("  position_size:    {}", config.position_size);
    eprintln!("  slippage:         {}", config.slippage);
    eprintln!("  brokerage:        {}", config.brokerage);
    eprintln!("  tax_rate:         {}%", config.tax_rate);
    eprintln!("  max_loss_per_day: {}", config.max_loss_per_day);
    eprintln!("  initial_capital:  {}", config.initial_capital);
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let s = &result.summary;
    eprintln!("\n=== Results ===");
    eprintln!("Total P&L:        {:.2}", s.total_pnl);
    eprintln!("Total Return:     {:.2}%", s.total_return_pct);
    eprintln!("Total Trades:     {}", s.num_trades);
    eprintln!("Win Rate:         {:.1}%", s.win_rate * 100.0);
    eprintln!("Avg Win:          {:.2}", s.avg_win);
    eprintln!("Avg Loss:         {:.2}", s.avg_loss);
    eprintln!("Largest Win:      {:.2}", s.largest_win);
    eprintln!("Largest Loss:     {:.2}", s.largest_loss);
    eprintln!("Max Drawdown:     {:.2}", s.max_drawdown);
    eprintln!("Profit Factor:    {}", s.profit_factor);
    eprintln!("Sharpe Ratio:     {:.2}", s.sharpe_ratio);
    eprintln!(
        "Streaks:          {} wins, {} losses",
        s.max_consecutive_wins, s.max_consecutive_losses
    );

    eprintln!("\n=== Exits ===");
    for reason in ExitReason::ALL {
        let count = s.exit_reasons.get(&reason).copied().unwrap_or(0);
        eprintln!("  {:<14} {}", reason.as_str(), count);
    }

    let stats = &result.stats;
    eprintln!(
        "\nCandidates: {} ({} refused re-entry, {} over daily loss)",
        stats.candidates, stats.rejected_reentry, stats.rejected_daily_loss
    );
    if s.warnings > 0 {
        eprintln!("warning: {} trade(s) flattened at end of data", s.warnings);
    }
}

/// Resolves every key against its default. Type errors and unparseable
/// values fail here; range checks are left to `validate_simulation_config`.
pub fn build_simulation_config(adapter: &dyn ConfigPort) -> Result<SimulationConfig, TradesimError> {
    debug!(source = adapter.source_name(), "resolving simulation config");

    let trailing = SimulationConfig::trailing_from(
        adapter.get_double(STRATEGY, "trail_trigger_pct")?,
        adapter.get_double(STRATEGY, "trail_lock_pct")?,
    )?;

    let reentry_mode = adapter
        .get_string(STRATEGY, "reentry_mode")
        .map(|s| s.parse::<ReentryMode>())
        .transpose()?;

    let reentry_delay = adapter
        .get_int(STRATEGY, "reentry_delay")?
        .map(|v| non_negative(v, "reentry_delay"))
        .transpose()?;

    let reentry_count = match adapter.get_int(STRATEGY, "reentry_count")? {
        Some(v) => non_negative(v, "reentry_count")?,
        None => 0,
    };

    let position_size = match adapter.get_int(COSTS, "position_size")? {
        Some(v) => non_negative(v, "position_size")?,
        None => DEFAULT_POSITION_SIZE,
    };

    Ok(SimulationConfig {
        sl_pct: adapter.get_double(STRATEGY, "sl_pct")?.unwrap_or(DEFAULT_SL_PCT),
        target_pct: adapter
            .get_double(STRATEGY, "target_pct")?
            .unwrap_or(DEFAULT_TARGET_PCT),
        trailing,
        reentry_count,
        reentry_mode,
        reentry_delay,
        position_size,
        slippage: adapter.get_double(COSTS, "slippage")?.unwrap_or(DEFAULT_SLIPPAGE),
        brokerage: adapter.get_double(COSTS, "brokerage")?.unwrap_or(DEFAULT_BROKERAGE),
        tax_rate: adapter.get_double(COSTS, "tax_rate")?.unwrap_or(DEFAULT_TAX_RATE),
        max_loss_per_day: adapter
            .get_double(COSTS, "max_loss_per_day")?
            .unwrap_or(DEFAULT_MAX_LOSS_PER_DAY),
        start_time: config_time(adapter, "start_time")?.unwrap_or_else(default_start_time),
        end_time: config_time(adapter, "end_time")?.unwrap_or_else(default_end_time),
        initial_capital: adapter
            .get_double(COSTS, "initial_capital")?
            .unwrap_or(DEFAULT_INITIAL_CAPITAL),
    })
}

fn non_negative<T: TryFrom<i64>>(value: i64, field: &'static str) -> Result<T, ConfigError> {
    T::try_from(value).map_err(|_| ConfigError::InvalidValue {
        field,
        reason: format!("expected a non-negative integer, got {value}"),
    })
}

fn config_time(
    adapter: &dyn ConfigPort,
    key: &'static str,
) -> Result<Option<chrono::NaiveTime>, ConfigError> {
    adapter
        .get_string(STRATEGY, key)
        .map(|raw| {
            parse_time(&raw).ok_or_else(|| ConfigError::InvalidValue {
                field: key,
                reason: format!("expected HH:MM or HH:MM:SS, got {raw:?}"),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn build(content: &str) -> Result<SimulationConfig, TradesimError> {
        build_simulation_config(&FileConfigAdapter::from_string(content).unwrap())
    }

    #[test]
    fn empty_config_resolves_defaults() {
        let config = build("[strategy]\n").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn reads_all_keys() {
        let config = build(
            "[strategy]\n\
             sl_pct = 1.5\n\
             target_pct = 3\n\
             trail_trigger_pct = 1\n\
             trail_lock_pct = 0.5\n\
             reentry_count = 2\n\
             reentry_mode = RE-DELAYED\n\
             reentry_delay = 3\n\
             start_time = 09:30\n\
             end_time = 15:00:00\n\
             [costs]\n\
             position_size = 50\n\
             slippage = 0.25\n\
             brokerage = 10\n\
             tax_rate = 18\n\
             max_loss_per_day = 2500\n\
             initial_capital = 50000\n",
        )
        .unwrap();

        assert_eq!(config.sl_pct, 1.5);
        assert_eq!(config.target_pct, 3.0);
        let trailing = config.trailing.unwrap();
        assert_eq!(trailing.trigger_pct, 1.0);
        assert_eq!(trailing.lock_pct, 0.5);
        assert_eq!(config.reentry_count, 2);
        assert_eq!(config.reentry_mode, Some(ReentryMode::Delayed));
        assert_eq!(config.reentry_delay, Some(3));
        assert_eq!(config.start_time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(config.end_time, NaiveTime::from_hms_opt(15, 0, 0).unwrap());
        assert_eq!(config.position_size, 50);
        assert_eq!(config.slippage, 0.25);
        assert_eq!(config.brokerage, 10.0);
        assert_eq!(config.tax_rate, 18.0);
        assert_eq!(config.max_loss_per_day, 2500.0);
        assert_eq!(config.initial_capital, 50000.0);
    }

    #[test]
    fn half_trailing_is_error() {
        let err = build("[strategy]\ntrail_trigger_pct = 1\n").unwrap_err();
        assert!(matches!(
            err,
            TradesimError::Config(ConfigError::MismatchedTrailing {
                missing: "trail_lock_pct"
            })
        ));
    }

    #[test]
    fn unknown_reentry_mode_is_error() {
        let err = build("[strategy]\nreentry_mode = SOMETIMES\n").unwrap_err();
        assert!(matches!(
            err,
            TradesimError::Config(ConfigError::InvalidReentryMode(_))
        ));
    }

    #[test]
    fn negative_count_is_error() {
        let err = build("[strategy]\nreentry_count = -1\n").unwrap_err();
        assert!(matches!(
            err,
            TradesimError::Config(ConfigError::InvalidValue {
                field: "reentry_count",
                ..
            })
        ));
    }

    #[test]
    fn bad_time_is_error() {
        let err = build("[strategy]\nstart_time = quarter past nine\n").unwrap_err();
        assert!(err.to_string().contains("start_time"));
    }

    #[test]
    fn non_numeric_value_is_parse_error() {
        let err = build("[costs]\nslippage = lots\n").unwrap_err();
        assert!(matches!(err, TradesimError::ConfigParse { .. }));
        assert_eq!(ExitCode::from(&err), ExitCode::from(2));
    }
}
