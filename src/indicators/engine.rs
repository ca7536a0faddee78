use serde::{Deserialize, Serialize};
use std::fmt;

use super::bollinger::bollinger_series;
use super::macd::macd_series;
use super::moving_average::sma_series;
use super::patterns::{doji_series, hammer_series, PatternConfig};
use super::rsi::rsi_series;
use crate::error::SignalError;
use crate::models::PriceSeries;
use crate::Result;

/// Windows and parameters for every indicator the engine produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub sma_period: usize,
    pub rsi_period: usize,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,
    pub patterns: PatternConfig,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_period: 50,
            rsi_period: 14,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            patterns: PatternConfig::default(),
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("sma_period", self.sma_period),
            ("rsi_period", self.rsi_period),
            ("macd_fast_period", self.macd_fast_period),
            ("macd_slow_period", self.macd_slow_period),
            ("macd_signal_period", self.macd_signal_period),
            ("bollinger_period", self.bollinger_period),
        ];
        for (name, period) in periods {
            if period == 0 {
                return Err(SignalError::invalid_config(format!("{} must be > 0", name)));
            }
        }

        if self.rsi_period < 2 {
            return Err(SignalError::invalid_config(format!(
                "rsi_period must be at least 2, got {}",
                self.rsi_period
            )));
        }

        if self.macd_fast_period >= self.macd_slow_period {
            return Err(SignalError::invalid_config(format!(
                "macd_fast_period ({}) must be less than macd_slow_period ({})",
                self.macd_fast_period, self.macd_slow_period
            )));
        }

        if !self.bollinger_std_dev.is_finite() || self.bollinger_std_dev <= 0.0 {
            return Err(SignalError::invalid_config(format!(
                "bollinger_std_dev must be positive, got {}",
                self.bollinger_std_dev
            )));
        }

        Ok(())
    }

    /// Samples needed before every indicator has a latest value
    pub fn min_samples_required(&self) -> usize {
        let macd_signal = self.macd_slow_period + self.macd_signal_period - 1;
        [
            self.sma_period,
            self.rsi_period,
            macd_signal,
            self.bollinger_period,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Every series the engine produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Sma,
    Rsi,
    Macd,
    MacdSignal,
    MacdHist,
    BbUpper,
    BbMiddle,
    BbLower,
    Doji,
    Hammer,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 10] = [
        IndicatorKind::Sma,
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::MacdSignal,
        IndicatorKind::MacdHist,
        IndicatorKind::BbUpper,
        IndicatorKind::BbMiddle,
        IndicatorKind::BbLower,
        IndicatorKind::Doji,
        IndicatorKind::Hammer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "sma",
            IndicatorKind::Rsi => "rsi",
            IndicatorKind::Macd => "macd",
            IndicatorKind::MacdSignal => "macd_signal",
            IndicatorKind::MacdHist => "macd_hist",
            IndicatorKind::BbUpper => "bb_upper",
            IndicatorKind::BbMiddle => "bb_middle",
            IndicatorKind::BbLower => "bb_lower",
            IndicatorKind::Doji => "doji",
            IndicatorKind::Hammer => "hammer",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indicator series aligned index-for-index with the source price series.
///
/// Every series has exactly the length of the input. `None` marks positions
/// where the lookback window has not filled yet. Series are never trimmed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSet {
    pub sma: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub macd_hist: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_middle: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
    pub doji: Vec<Option<f64>>,
    pub hammer: Vec<Option<f64>>,
}

impl IndicatorSet {
    pub fn get(&self, kind: IndicatorKind) -> &[Option<f64>] {
        match kind {
            IndicatorKind::Sma => &self.sma,
            IndicatorKind::Rsi => &self.rsi,
            IndicatorKind::Macd => &self.macd,
            IndicatorKind::MacdSignal => &self.macd_signal,
            IndicatorKind::MacdHist => &self.macd_hist,
            IndicatorKind::BbUpper => &self.bb_upper,
            IndicatorKind::BbMiddle => &self.bb_middle,
            IndicatorKind::BbLower => &self.bb_lower,
            IndicatorKind::Doji => &self.doji,
            IndicatorKind::Hammer => &self.hammer,
        }
    }

    /// Look a series up by its name (`"sma"`, `"macd_signal"`, ...)
    pub fn by_name(&self, name: &str) -> Option<&[Option<f64>]> {
        IndicatorKind::ALL
            .iter()
            .find(|k| k.as_str() == name)
            .map(|k| self.get(*k))
    }

    pub fn iter(&self) -> impl Iterator<Item = (IndicatorKind, &[Option<f64>])> + '_ {
        IndicatorKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }

    /// Value at the most recent position
    pub fn latest(&self, kind: IndicatorKind) -> Option<f64> {
        self.get(kind).last().copied().flatten()
    }

    /// Length shared by all series (equals the source series length)
    pub fn len(&self) -> usize {
        self.sma.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sma.is_empty()
    }
}

/// Turns a price series into the full indicator set
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn compute(&self, series: &PriceSeries) -> IndicatorSet {
        let cfg = &self.config;
        let prices = series.prices();
        let candles = series.to_flat_candles();

        let macd = macd_series(
            &prices,
            cfg.macd_fast_period,
            cfg.macd_slow_period,
            cfg.macd_signal_period,
        );
        let bands = bollinger_series(&prices, cfg.bollinger_period, cfg.bollinger_std_dev);

        let set = IndicatorSet {
            sma: sma_series(&prices, cfg.sma_period),
            rsi: rsi_series(&prices, cfg.rsi_period),
            macd: macd.macd,
            macd_signal: macd.signal,
            macd_hist: macd.histogram,
            bb_upper: bands.upper,
            bb_middle: bands.middle,
            bb_lower: bands.lower,
            doji: doji_series(&candles, &cfg.patterns),
            hammer: hammer_series(&candles, &cfg.patterns),
        };

        tracing::debug!(
            samples = series.len(),
            sma = ?set.latest(IndicatorKind::Sma),
            rsi = ?set.latest(IndicatorKind::Rsi),
            macd = ?set.latest(IndicatorKind::Macd),
            macd_signal = ?set.latest(IndicatorKind::MacdSignal),
            bb_lower = ?set.latest(IndicatorKind::BbLower),
            bb_upper = ?set.latest(IndicatorKind::BbUpper),
            "Computed indicators"
        );

        set
    }
}
