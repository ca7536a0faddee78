//! Single-bar candlestick pattern detectors.
//!
//! Each detector returns a flag per candle: `100.0` when the pattern is
//! present, `0.0` when it is not. Neither detector reports a bearish variant.
//!
//! When the price source only supplies one price per period, candles are flat
//! (open = high = low = close). On such bars a doji is always detected (zero
//! body inside a zero range) and a hammer never is (no lower shadow). The
//! classifier can ignore these flags via `ClassifierConfig::require_patterns`.

use serde::{Deserialize, Serialize};

use crate::models::Candle;

pub const PATTERN_DETECTED: f64 = 100.0;
pub const PATTERN_ABSENT: f64 = 0.0;

/// Shape thresholds, expressed as fractions of the candle range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Doji: body no larger than this fraction of the range
    pub doji_body_ratio: f64,
    /// Hammer: body no larger than this fraction of the range
    pub hammer_body_ratio: f64,
    /// Hammer: lower shadow at least this multiple of the body
    pub hammer_shadow_multiple: f64,
    /// Hammer: upper shadow no larger than this fraction of the range
    pub hammer_upper_shadow_ratio: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            doji_body_ratio: 0.1,
            hammer_body_ratio: 0.33,
            hammer_shadow_multiple: 2.0,
            hammer_upper_shadow_ratio: 0.1,
        }
    }
}

/// Doji: open and close (nearly) equal, signalling indecision
pub fn is_doji(candle: &Candle, config: &PatternConfig) -> bool {
    candle.body() <= config.doji_body_ratio * candle.range()
}

/// Hammer: small body at the top of the range with a long lower shadow
pub fn is_hammer(candle: &Candle, config: &PatternConfig) -> bool {
    let range = candle.range();
    if range <= 0.0 {
        return false;
    }

    let body = candle.body();
    let lower = candle.lower_shadow();

    lower > 0.0
        && body <= config.hammer_body_ratio * range
        && lower >= config.hammer_shadow_multiple * body
        && candle.upper_shadow() <= config.hammer_upper_shadow_ratio * range
}

fn flag(detected: bool) -> f64 {
    if detected {
        PATTERN_DETECTED
    } else {
        PATTERN_ABSENT
    }
}

pub fn doji_series(candles: &[Candle], config: &PatternConfig) -> Vec<Option<f64>> {
    candles
        .iter()
        .map(|c| Some(flag(is_doji(c, config))))
        .collect()
}

pub fn hammer_series(candles: &[Candle], config: &PatternConfig) -> Vec<Option<f64>> {
    candles
        .iter()
        .map(|c| Some(flag(is_hammer(c, config))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: Utc::now(),
            open,
            high,
            low,
            close,
        }
    }

    #[test]
    fn test_doji_detected() {
        let config = PatternConfig::default();
        assert!(is_doji(&candle(100.0, 105.0, 95.0, 100.5), &config));
        assert!(!is_doji(&candle(100.0, 105.0, 95.0, 104.0), &config));
    }

    #[test]
    fn test_hammer_detected() {
        let config = PatternConfig::default();
        // Small body near the high, long lower tail
        assert!(is_hammer(&candle(99.0, 100.2, 90.0, 100.0), &config));
        // Long upper tail (inverted hammer) is not a hammer
        assert!(!is_hammer(&candle(90.5, 100.0, 90.0, 90.0), &config));
        // Big body
        assert!(!is_hammer(&candle(91.0, 100.0, 90.0, 100.0), &config));
    }

    #[test]
    fn test_flat_candles_are_degenerate() {
        let config = PatternConfig::default();
        let flat = Candle::flat(Utc::now(), 100.0);
        assert!(is_doji(&flat, &config));
        assert!(!is_hammer(&flat, &config));
    }

    #[test]
    fn test_series_are_defined_everywhere() {
        let config = PatternConfig::default();
        let candles = vec![
            Candle::flat(Utc::now(), 100.0),
            candle(98.5, 100.2, 90.0, 100.0),
        ];
        assert_eq!(doji_series(&candles, &config), vec![Some(100.0), Some(0.0)]);
        assert_eq!(hammer_series(&candles, &config), vec![Some(0.0), Some(100.0)]);
    }
}
