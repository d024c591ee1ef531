//! CSV bar loader.
//!
//! Header names are matched case-insensitively. Prices may carry thousands
//! separators. Indicator columns missing from the file are computed from the
//! close series and the warm-up rows without a value are dropped.

use crate::adapters::indicator::{
    FAST_AVG_PERIOD, OSCILLATOR_PERIOD, calculate_ema, calculate_rsi,
};
use crate::domain::bar::Bar;
use crate::domain::config::parse_time;
use crate::domain::error::TradesimError;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveTime};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataPort for CsvAdapter {
    fn load_bars(&self) -> Result<Vec<Bar>, TradesimError> {
        let content = fs::read_to_string(&self.path)?;
        let bars = parse_bars(&content)?;
        info!(path = %self.path.display(), bars = bars.len(), "loaded bars");
        Ok(bars)
    }
}

/// Column positions resolved from the header row.
struct Columns {
    date: usize,
    time: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    fast_avg: Option<usize>,
    oscillator: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, TradesimError> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let require = |name: &str| {
            find_column(&names, &[name]).ok_or_else(|| TradesimError::Csv {
                reason: format!("missing column {name}"),
            })
        };

        Ok(Columns {
            date: require("date")?,
            time: require("time")?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            fast_avg: find_column(&names, &["fast_avg", "ema", "ema20"]),
            oscillator: find_column(&names, &["oscillator", "rsi", "rsi14"]),
        })
    }
}

fn find_column(names: &[String], aliases: &[&str]) -> Option<usize> {
    names.iter().position(|n| aliases.contains(&n.as_str()))
}

/// Parses CSV text into bars in file order.
pub fn parse_bars(content: &str) -> Result<Vec<Bar>, TradesimError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = rdr.headers().map_err(|e| TradesimError::Csv {
        reason: format!("failed to read header: {e}"),
    })?;
    let columns = Columns::resolve(headers)?;

    let mut bars = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| TradesimError::Csv {
            reason: format!("CSV parse error: {e}"),
        })?;
        // header is line 1
        let line = row + 2;

        bars.push(Bar {
            date: parse_date(field(&record, columns.date, "date", line)?, line)?,
            time: parse_bar_time(field(&record, columns.time, "time", line)?, line)?,
            open: parse_price(field(&record, columns.open, "open", line)?, "open", line)?,
            high: parse_price(field(&record, columns.high, "high", line)?, "high", line)?,
            low: parse_price(field(&record, columns.low, "low", line)?, "low", line)?,
            close: parse_price(field(&record, columns.close, "close", line)?, "close", line)?,
            fast_avg: optional_value(&record, columns.fast_avg, "fast_avg", line)?,
            oscillator: optional_value(&record, columns.oscillator, "oscillator", line)?,
        });
    }

    Ok(fill_indicators(
        bars,
        columns.fast_avg.is_none(),
        columns.oscillator.is_none(),
    ))
}

fn fill_indicators(bars: Vec<Bar>, compute_fast: bool, compute_osc: bool) -> Vec<Bar> {
    if !compute_fast && !compute_osc {
        return bars;
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let fast = compute_fast.then(|| calculate_ema(&closes, FAST_AVG_PERIOD));
    let osc = compute_osc.then(|| calculate_rsi(&closes, OSCILLATOR_PERIOD));

    let total = bars.len();
    let filled: Vec<Bar> = bars
        .into_iter()
        .enumerate()
        .filter_map(|(i, mut bar)| {
            if let Some(values) = &fast {
                bar.fast_avg = Some(values[i]?);
            }
            if let Some(values) = &osc {
                bar.oscillator = Some(values[i]?);
            }
            Some(bar)
        })
        .collect();

    debug!(
        computed_fast_avg = compute_fast,
        computed_oscillator = compute_osc,
        dropped = total - filled.len(),
        "filled missing indicator columns"
    );
    filled
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
    line: usize,
) -> Result<&'r str, TradesimError> {
    record.get(index).ok_or_else(|| TradesimError::Csv {
        reason: format!("line {line}: missing {name} value"),
    })
}

fn parse_date(raw: &str, line: usize) -> Result<NaiveDate, TradesimError> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| TradesimError::Csv {
            reason: format!("line {line}: invalid date {raw:?}"),
        })
}

fn parse_bar_time(raw: &str, line: usize) -> Result<NaiveTime, TradesimError> {
    parse_time(raw).ok_or_else(|| TradesimError::Csv {
        reason: format!("line {line}: invalid time {raw:?}"),
    })
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").trim().parse().ok()
}

fn parse_price(raw: &str, name: &str, line: usize) -> Result<f64, TradesimError> {
    parse_number(raw).ok_or_else(|| TradesimError::Csv {
        reason: format!("line {line}: invalid {name} value {raw:?}"),
    })
}

/// Empty cells are missing values; anything else must be a number.
fn optional_value(
    record: &csv::StringRecord,
    index: Option<usize>,
    name: &str,
    line: usize,
) -> Result<Option<f64>, TradesimError> {
    let Some(index) = index else {
        return Ok(None);
    };
    match record.get(index).map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_price(raw, name, line).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const WITH_INDICATORS: &str = "Date,Time,Open,High,Low,Close,EMA,RSI\n\
        2024-01-15,09:15,100,101,99,100.5,100.0,55\n\
        2024-01-15,09:20:00,100.5,102,100,101.5,100.2,61.5\n";

    #[test]
    fn parses_bars_with_indicator_columns() {
        let bars = parse_bars(WITH_INDICATORS).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[0].time, NaiveTime::from_hms_opt(9, 15, 0).unwrap());
        assert_eq!(bars[1].time, NaiveTime::from_hms_opt(9, 20, 0).unwrap());
        assert_eq!(bars[1].close, 101.5);
        assert_eq!(bars[1].fast_avg, Some(100.2));
        assert_eq!(bars[1].oscillator, Some(61.5));
    }

    #[test]
    fn accepts_alternative_indicator_names() {
        let content = "date,time,open,high,low,close,fast_avg,oscillator\n\
            2024-01-15,09:15,100,101,99,100.5,100.0,55\n";
        let bars = parse_bars(content).unwrap();
        assert_eq!(bars[0].fast_avg, Some(100.0));
        assert_eq!(bars[0].oscillator, Some(55.0));
    }

    #[test]
    fn accepts_day_first_dates() {
        assert_eq!(
            parse_date("15-01-2024", 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(
            parse_date("15/01/2024", 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert!(parse_date("January 15", 2).is_err());
    }

    #[test]
    fn strips_thousands_separators() {
        let content = "date,time,open,high,low,close,ema,rsi\n\
            2024-01-15,09:15,\"21,500.5\",\"21,510\",\"21,490\",\"21,505.25\",21500,55\n";
        let bars = parse_bars(content).unwrap();
        assert_eq!(bars[0].open, 21500.5);
        assert_eq!(bars[0].close, 21505.25);
    }

    #[test]
    fn empty_indicator_cell_is_missing() {
        let content = "date,time,open,high,low,close,ema,rsi\n\
            2024-01-15,09:15,100,101,99,100.5,,55\n";
        let bars = parse_bars(content).unwrap();
        assert_eq!(bars[0].fast_avg, None);
        assert_eq!(bars[0].oscillator, Some(55.0));
    }

    #[test]
    fn computes_missing_indicators_and_drops_warmup() {
        let mut content = String::from("date,time,open,high,low,close\n");
        for i in 0..30 {
            let close = 100.0 + (i % 5) as f64;
            content.push_str(&format!(
                "2024-01-15,{:02}:{:02},{close},{},{},{close}\n",
                9 + i / 12,
                (i % 12) * 5,
                close + 1.0,
                close - 1.0
            ));
        }
        let bars = parse_bars(&content).unwrap();
        // EMA(20) warms up over 19 rows, RSI(14) over 14.
        assert_eq!(bars.len(), 30 - (FAST_AVG_PERIOD - 1));
        assert!(bars.iter().all(|b| b.fast_avg.is_some() && b.oscillator.is_some()));
    }

    #[test]
    fn keeps_supplied_column_when_other_is_computed() {
        let mut content = String::from("date,time,open,high,low,close,rsi\n");
        for i in 0..25 {
            content.push_str(&format!("2024-01-15,10:{i:02},100,101,99,100,42\n"));
        }
        let bars = parse_bars(&content).unwrap();
        assert_eq!(bars.len(), 25 - (FAST_AVG_PERIOD - 1));
        assert!(bars.iter().all(|b| b.oscillator == Some(42.0)));
        assert!((bars[0].fast_avg.unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn missing_required_column_is_error() {
        let err = parse_bars("date,time,open,high,low\n").unwrap_err();
        assert!(matches!(err, TradesimError::Csv { .. }));
        assert!(err.to_string().contains("close"));
    }

    #[test]
    fn invalid_price_names_line() {
        let content = "date,time,open,high,low,close,ema,rsi\n\
            2024-01-15,09:15,100,101,99,abc,100,55\n";
        let err = parse_bars(content).unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(err.to_string().contains("close"));
    }

    #[test]
    fn invalid_time_is_error() {
        let content = "date,time,open,high,low,close,ema,rsi\n\
            2024-01-15,9.15am,100,101,99,100,100,55\n";
        assert!(parse_bars(content).is_err());
    }

    #[test]
    fn header_only_gives_no_bars() {
        let bars = parse_bars("date,time,open,high,low,close,ema,rsi\n").unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn load_bars_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", WITH_INDICATORS).unwrap();
        let bars = CsvAdapter::new(file.path()).load_bars().unwrap();
        assert_eq!(bars.len(), 2);
    }

    #[test]
    fn load_bars_missing_file_is_io_error() {
        let err = CsvAdapter::new("/nonexistent/bars.csv")
            .load_bars()
            .unwrap_err();
        assert!(matches!(err, TradesimError::Io(_)));
    }
}
