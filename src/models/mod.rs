use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SignalError;
use crate::Result;

/// A single observed price at a point in time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PriceSample {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Validated, immutable price history (index 0 = oldest)
///
/// Guarantees once constructed:
/// - at least one sample
/// - every price is finite and > 0
/// - timestamps strictly increasing
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceSeries {
    samples: Vec<PriceSample>,
}

impl PriceSeries {
    /// Validate samples and build a series. Nothing is coerced: any violation
    /// is reported as `MalformedInput`.
    pub fn new(samples: Vec<PriceSample>) -> Result<Self> {
        if samples.is_empty() {
            return Err(SignalError::malformed("price series is empty"));
        }

        for (i, sample) in samples.iter().enumerate() {
            if !sample.price.is_finite() || sample.price <= 0.0 {
                return Err(SignalError::malformed(format!(
                    "price at index {} must be positive and finite, got {}",
                    i, sample.price
                )));
            }
        }

        for (i, window) in samples.windows(2).enumerate() {
            if window[1].timestamp <= window[0].timestamp {
                return Err(SignalError::malformed(format!(
                    "timestamps not strictly increasing at index {} ({} then {})",
                    i + 1,
                    window[0].timestamp,
                    window[1].timestamp
                )));
            }
        }

        Ok(Self { samples })
    }

    /// Build a series from `[timestamp_ms, price]` pairs as returned by
    /// CoinGecko's market_chart endpoint.
    pub fn from_millis_pairs(pairs: &[[f64; 2]]) -> Result<Self> {
        let samples = pairs
            .iter()
            .map(|[ts_ms, price]| {
                let ts = DateTime::<Utc>::from_timestamp_millis(*ts_ms as i64).ok_or_else(|| {
                    SignalError::malformed(format!("timestamp {} out of range", ts_ms))
                })?;
                Ok(PriceSample::new(ts, *price))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(samples)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed series; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[PriceSample] {
        &self.samples
    }

    pub fn prices(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.price).collect()
    }

    /// Most recent sample
    pub fn last(&self) -> &PriceSample {
        // Non-empty by construction
        &self.samples[self.samples.len() - 1]
    }

    /// Collapse every sample into a flat OHLC candle (open = high = low = close).
    pub fn to_flat_candles(&self) -> Vec<Candle> {
        self.samples
            .iter()
            .map(|s| Candle::flat(s.timestamp, s.price))
            .collect()
    }
}

/// OHLC candlestick, input to the pattern detectors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// Degenerate candle for sources that only report a single price
    pub fn flat(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            timestamp,
            open: price,
            high: price,
            low: price,
            close: price,
        }
    }

    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }
}

/// Trading signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        };
        f.write_str(s)
    }
}
