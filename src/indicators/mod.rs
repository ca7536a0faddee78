// Technical indicators module
// SMA, EMA, RSI, MACD, Bollinger Bands and candlestick patterns, all as
// series aligned with the input prices

pub mod bollinger;
pub mod engine;
pub mod macd;
pub mod moving_average;
pub mod patterns;
pub mod rsi;

pub use bollinger::{bollinger_series, BollingerSeries};
pub use engine::{IndicatorConfig, IndicatorEngine, IndicatorKind, IndicatorSet};
pub use macd::{macd_series, MacdSeries};
pub use moving_average::{ema_series, ema_series_dense, sma_series};
pub use patterns::{doji_series, hammer_series, is_doji, is_hammer, PatternConfig};
pub use rsi::rsi_series;
