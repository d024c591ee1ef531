//! Intraday price bar with precomputed indicator values.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use super::error::DataError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Fast moving average of close, supplied by the data source.
    pub fast_avg: Option<f64>,
    /// Bounded 0..100 oscillator, supplied by the data source.
    pub oscillator: Option<f64>,
}

impl Bar {
    /// Sort key; bars must be strictly increasing in it.
    pub fn timestamp(&self) -> (NaiveDate, NaiveTime) {
        (self.date, self.time)
    }
}

/// Checks the bar stream before a run: non-empty, strictly increasing
/// (date, time), sane prices and both indicator values present.
pub fn validate_bars(bars: &[Bar]) -> Result<(), DataError> {
    if bars.is_empty() {
        return Err(DataError::EmptyBarStream);
    }

    for (index, bar) in bars.iter().enumerate() {
        if let Some(reason) = price_problem(bar) {
            return Err(DataError::InvalidPrice {
                index,
                date: bar.date,
                time: bar.time,
                reason,
            });
        }

        let missing = match (bar.fast_avg, bar.oscillator) {
            (None, _) => Some("fast_avg"),
            (Some(v), _) if !v.is_finite() => Some("fast_avg"),
            (_, None) => Some("oscillator"),
            (_, Some(v)) if !v.is_finite() => Some("oscillator"),
            _ => None,
        };
        if let Some(field) = missing {
            return Err(DataError::MissingIndicator {
                index,
                date: bar.date,
                time: bar.time,
                field,
            });
        }

        if index > 0 {
            let prev = &bars[index - 1];
            if bar.timestamp() <= prev.timestamp() {
                return Err(DataError::NonMonotonic {
                    index,
                    prev_date: prev.date,
                    prev_time: prev.time,
                    date: bar.date,
                    time: bar.time,
                });
            }
        }
    }

    Ok(())
}

fn price_problem(bar: &Bar) -> Option<String> {
    let prices = [bar.open, bar.high, bar.low, bar.close];
    if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
        return Some("prices must be positive and finite".into());
    }
    if bar.low > bar.high {
        return Some(format!("low {} above high {}", bar.low, bar.high));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar_at(hour: u32, minute: u32) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.5,
            fast_avg: Some(100.0),
            oscillator: Some(55.0),
        }
    }

    #[test]
    fn accepts_ordered_stream() {
        let bars = vec![bar_at(9, 15), bar_at(9, 20), bar_at(9, 25)];
        assert!(validate_bars(&bars).is_ok());
    }

    #[test]
    fn rejects_empty_stream() {
        assert_eq!(validate_bars(&[]), Err(DataError::EmptyBarStream));
    }

    #[test]
    fn rejects_duplicate_timestamp() {
        let bars = vec![bar_at(9, 15), bar_at(9, 15)];
        let err = validate_bars(&bars).unwrap_err();
        assert!(matches!(err, DataError::NonMonotonic { index: 1, .. }));
    }

    #[test]
    fn rejects_backwards_time() {
        let bars = vec![bar_at(9, 20), bar_at(9, 15)];
        assert!(matches!(
            validate_bars(&bars),
            Err(DataError::NonMonotonic { index: 1, .. })
        ));
    }

    #[test]
    fn next_day_earlier_time_is_ordered() {
        let mut next_day = bar_at(9, 15);
        next_day.date = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        let bars = vec![bar_at(15, 15), next_day];
        assert!(validate_bars(&bars).is_ok());
    }

    #[test]
    fn rejects_missing_fast_avg() {
        let mut bar = bar_at(9, 15);
        bar.fast_avg = None;
        assert!(matches!(
            validate_bars(&[bar]),
            Err(DataError::MissingIndicator { field: "fast_avg", .. })
        ));
    }

    #[test]
    fn rejects_nan_oscillator() {
        let mut bar = bar_at(9, 15);
        bar.oscillator = Some(f64::NAN);
        assert!(matches!(
            validate_bars(&[bar]),
            Err(DataError::MissingIndicator { field: "oscillator", .. })
        ));
    }

    #[test]
    fn rejects_inverted_range() {
        let mut bar = bar_at(9, 15);
        bar.low = 102.0;
        assert!(matches!(
            validate_bars(&[bar]),
            Err(DataError::InvalidPrice { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_non_positive_price() {
        let mut bar = bar_at(9, 15);
        bar.close = 0.0;
        assert!(validate_bars(&[bar]).is_err());
    }
}
