/// Relative Strength Index (RSI) series
///
/// RSI measures the magnitude of recent price changes to evaluate
/// overbought or oversold conditions.
///
/// Values:
/// - RSI > 70: Overbought
/// - RSI < 30: Oversold
///
/// The window is `period` samples, so the first value lands at index
/// `period - 1`. Averages are seeded with the simple means of the
/// `period - 1` changes inside that window and then Wilder-smoothed.
pub fn rsi_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    if period < 2 || prices.len() < period {
        return out;
    }

    let seed_changes = (period - 1) as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..period {
        let (gain, loss) = split_change(prices[i] - prices[i - 1]);
        avg_gain += gain;
        avg_loss += loss;
    }
    avg_gain /= seed_changes;
    avg_loss /= seed_changes;
    out[period - 1] = Some(rsi_from_averages(avg_gain, avg_loss));

    let smoothing = period as f64 - 1.0;
    for i in period..prices.len() {
        let (gain, loss) = split_change(prices[i] - prices[i - 1]);
        avg_gain = (avg_gain * smoothing + gain) / period as f64;
        avg_loss = (avg_loss * smoothing + loss) / period as f64;
        out[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }

    out
}

fn split_change(change: f64) -> (f64, f64) {
    if change > 0.0 {
        (change, 0.0)
    } else {
        (0.0, change.abs())
    }
}

/// No movement at all is neutral (50); no losses is 100; no gains is 0.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return 50.0;
        }
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_calculation() {
        // Test with known values
        let prices = vec![
            44.0, 44.25, 44.5, 43.75, 44.0, 44.5, 45.0, 45.5, 45.25, 45.5, 46.0, 46.5, 46.25,
            46.0, 46.5,
        ];

        let rsi = rsi_series(&prices, 14);
        assert_eq!(rsi.len(), prices.len());
        assert!(rsi[..13].iter().all(Option::is_none));

        let rsi_value = rsi[13].unwrap();
        assert!(rsi_value > 0.0 && rsi_value < 100.0);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let prices = vec![100.0, 102.0, 101.0];
        let rsi = rsi_series(&prices, 14);
        assert!(rsi.iter().all(Option::is_none));
    }

    #[test]
    fn test_rsi_all_gains() {
        let prices = vec![100.0, 101.0, 102.0, 103.0, 104.0, 105.0];
        let rsi = rsi_series(&prices, 5);
        assert_eq!(rsi[4], Some(100.0)); // All gains = RSI 100
        assert_eq!(rsi[5], Some(100.0));
    }

    #[test]
    fn test_rsi_all_losses() {
        let prices = vec![105.0, 104.0, 103.0, 102.0, 101.0, 100.0, 99.0];
        let rsi = rsi_series(&prices, 5);
        assert_eq!(rsi[4], Some(0.0));
        assert_eq!(rsi[6], Some(0.0));
    }

    #[test]
    fn test_rsi_flat_is_neutral() {
        let prices = vec![100.0; 20];
        let rsi = rsi_series(&prices, 14);
        assert_eq!(rsi[13], Some(50.0));
        assert_eq!(rsi[19], Some(50.0));
    }

    #[test]
    fn test_rsi_first_value_when_window_fills() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.9).sin() * 3.0).collect();
        let rsi = rsi_series(&prices, 14);
        assert_eq!(rsi.iter().position(Option::is_some), Some(13));
        assert!(rsi[13..].iter().all(Option::is_some));

        // Exactly one window of samples is enough
        let rsi = rsi_series(&prices[..14], 14);
        assert!(rsi[13].is_some());
    }

    #[test]
    fn test_rsi_period_below_two_undefined() {
        let prices = vec![100.0, 101.0, 102.0];
        assert!(rsi_series(&prices, 1).iter().all(Option::is_none));
    }

    #[test]
    fn test_rsi_balanced_moves() {
        // Equal gains and losses -> RS = 1 -> RSI 50
        let prices = vec![100.0, 101.0, 100.0, 101.0, 100.0];
        let rsi = rsi_series(&prices, 4);
        assert!((rsi[4].unwrap() - 50.0).abs() < 1e-9);
    }
}
