//! Bollinger Bands indicator.

/// Bollinger Bands, each band aligned with the input prices.
///
/// - Middle band: SMA(period)
/// - Upper band: SMA + k * StdDev
/// - Lower band: SMA - k * StdDev
///
/// StdDev is the population standard deviation of the same window.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

pub fn bollinger_series(prices: &[f64], period: usize, std_dev_multiplier: f64) -> BollingerSeries {
    let n = prices.len();
    let mut bands = BollingerSeries {
        upper: vec![None; n],
        middle: vec![None; n],
        lower: vec![None; n],
    };
    if period == 0 || n < period {
        return bands;
    }

    for (i, window) in prices.windows(period).enumerate() {
        let idx = i + period - 1;
        let middle = window.iter().sum::<f64>() / period as f64;
        let std_dev = std_dev(window, middle);

        bands.middle[idx] = Some(middle);
        bands.upper[idx] = Some(middle + std_dev_multiplier * std_dev);
        bands.lower[idx] = Some(middle - std_dev_multiplier * std_dev);
    }

    bands
}

fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance: f64 =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
