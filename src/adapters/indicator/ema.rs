//! Exponential moving average.
//!
//! k = 2/(n+1), seeded with the first close, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). The recursion runs from the first bar
//! but the first (n-1) values are reported as `None`.

pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = None;

    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let next = match ema {
                None => close,
                Some(prev) => close * k + prev * (1.0 - k),
            };
            ema = Some(next);
            (i + 1 >= period).then_some(next)
        })
        .collect()
}
