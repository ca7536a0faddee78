/// Simple Moving Average (SMA) series
///
/// Output is aligned with `prices`: position `i` holds the mean of the
/// `period` prices ending at `i`, or `None` while `i < period - 1`.
pub fn sma_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    if period == 0 || prices.len() < period {
        return out;
    }

    for (i, window) in prices.windows(period).enumerate() {
        let sum: f64 = window.iter().sum();
        out[i + period - 1] = Some(sum / period as f64);
    }

    out
}

/// Exponential Moving Average (EMA) series over a possibly sparse input
///
/// Leading `None`s are skipped; the EMA is seeded with the simple average of
/// the first `period` defined values and then smoothed with
/// `alpha = 2 / (period + 1)`. Output stays aligned with `values`.
pub fn ema_series(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let Some(start) = values.iter().position(Option::is_some) else {
        return out;
    };
    let seed_end = start + period;
    if seed_end > values.len() {
        return out;
    }

    // None if the seed window has a hole
    let Some(seed_sum) = values[start..seed_end].iter().copied().sum::<Option<f64>>() else {
        return out;
    };

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut ema = seed_sum / period as f64;
    out[seed_end - 1] = Some(ema);

    for (i, value) in values.iter().enumerate().skip(seed_end) {
        let Some(value) = value else {
            break;
        };
        ema = (value - ema) * multiplier + ema;
        out[i] = Some(ema);
    }

    out
}

/// EMA series over a dense price slice
pub fn ema_series_dense(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let values: Vec<Option<f64>> = prices.iter().copied().map(Some).collect();
    ema_series(&values, period)
}
