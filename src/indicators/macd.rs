//! MACD (Moving Average Convergence Divergence) indicator.

use super::moving_average::{ema_series, ema_series_dense};

/// MACD line, signal line and histogram, each aligned with the input prices.
///
/// - MACD Line = EMA(fast) - EMA(slow), defined from index `slow - 1`
/// - Signal Line = EMA(signal) of the MACD line, defined from `slow + signal - 2`
/// - Histogram = MACD Line - Signal Line
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

pub fn macd_series(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdSeries {
    let fast = ema_series_dense(prices, fast_period);
    let slow = ema_series_dense(prices, slow_period);

    let macd: Vec<Option<f64>> = fast
        .iter()
        .zip(slow.iter())
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let signal = ema_series(&macd, signal_period);

    let histogram = macd
        .iter()
        .zip(signal.iter())
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    MacdSeries {
        macd,
        signal,
        histogram,
    }
}
