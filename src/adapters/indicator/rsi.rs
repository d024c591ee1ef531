//! Relative strength index.
//!
//! Gains and losses are smoothed with alpha = 1/n from the first bar, where
//! the first bar has no change and counts as zero gain and zero loss:
//! avg[i] = avg[i-1] + (x[i] - avg[i-1]) / n.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss), and 100 when avg_loss is 0.
//! The first n values are `None`.

pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    let alpha = 1.0 / period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    let mut previous: Option<f64> = None;

    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let change = previous.map_or(0.0, |prev| close - prev);
            previous = Some(close);

            avg_gain += (change.max(0.0) - avg_gain) * alpha;
            avg_loss += ((-change).max(0.0) - avg_loss) * alpha;

            (i >= period).then(|| rsi_from_averages(avg_gain, avg_loss))
        })
        .collect()
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rsi_empty_and_single() {
        assert!(calculate_rsi(&[], 14).is_empty());
        assert_eq!(calculate_rsi(&[10.0], 14), vec![None]);
    }

    #[test]
    fn rsi_warmup_period() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let values = calculate_rsi(&closes, 3);
        assert_eq!(values.len(), 10);
        assert!(values[..3].iter().all(Option::is_none));
        assert!(values[3..].iter().all(Option::is_some));
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let values = calculate_rsi(&closes, 14);
        assert_relative_eq!(values[19].unwrap(), 100.0);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let values = calculate_rsi(&closes, 14);
        assert_relative_eq!(values[19].unwrap(), 0.0);
    }

    #[test]
    fn rsi_known_calculation() {
        // gains  0, 2, 0, 3, 0 -> averages 0, 2/3, 4/9, 35/27, 70/81
        // losses 0, 0, 1, 0, 2 -> averages 0, 0, 1/3, 2/9, 22/27
        let values = calculate_rsi(&[10.0, 12.0, 11.0, 14.0, 12.0], 3);
        assert!(values[..3].iter().all(Option::is_none));
        assert_relative_eq!(values[3].unwrap(), 3500.0 / 41.0, epsilon = 1e-9);
        assert_relative_eq!(values[4].unwrap(), 875.0 / 17.0, epsilon = 1e-9);
    }

    #[test]
    fn rsi_first_bar_counts_as_flat() {
        // A single up move then flat: avg_gain decays from alpha * 1.
        let closes = [10.0, 11.0, 11.0, 11.0];
        let values = calculate_rsi(&closes, 2);
        assert_relative_eq!(values[2].unwrap(), 100.0);
        assert_relative_eq!(values[3].unwrap(), 100.0);

        let closes = [10.0, 11.0, 10.5, 10.5];
        // gains 0, 1, 0, 0 -> 0, 0.5, 0.25, 0.125
        // losses 0, 0, 0.5, 0 -> 0, 0, 0.25, 0.125
        let values = calculate_rsi(&closes, 2);
        assert_relative_eq!(values[2].unwrap(), 50.0, epsilon = 1e-9);
        assert_relative_eq!(values[3].unwrap(), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn rsi_stays_in_range() {
        let closes = [
            44.0, 44.3, 44.1, 43.6, 44.3, 44.8, 45.1, 45.4, 45.8, 46.1, 45.9, 46.2, 45.6, 46.3,
            46.3, 46.0, 46.4, 46.2, 45.6, 46.2,
        ];
        for v in calculate_rsi(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v));
        }
    }
}
