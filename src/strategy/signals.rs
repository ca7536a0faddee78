use serde::{Deserialize, Serialize};

use super::report::format_report;
use crate::error::SignalError;
use crate::indicators::{IndicatorKind, IndicatorSet};
use crate::models::Signal;
use crate::Result;

pub const INSUFFICIENT_DATA: &str = "insufficient data";
pub const NO_CONSENSUS: &str = "no clear consensus across indicators";

/// Thresholds for the consensus rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Require the hammer (BUY) / doji (SELL) flag. Flat candles built from a
    /// single price stream make these flags degenerate, so this can be turned off.
    pub require_patterns: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            require_patterns: true,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<()> {
        let in_range = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
        if !in_range(self.rsi_oversold) || !in_range(self.rsi_overbought) {
            return Err(SignalError::invalid_config(format!(
                "RSI thresholds must be within 0-100 (oversold={}, overbought={})",
                self.rsi_oversold, self.rsi_overbought
            )));
        }
        if self.rsi_oversold >= self.rsi_overbought {
            return Err(SignalError::invalid_config(format!(
                "rsi_oversold ({}) must be below rsi_overbought ({})",
                self.rsi_oversold, self.rsi_overbought
            )));
        }
        Ok(())
    }
}

/// Live price plus the most recent value of every indicator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestSnapshot {
    pub live_price: f64,
    pub sma: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub doji: Option<f64>,
    pub hammer: Option<f64>,
}

impl LatestSnapshot {
    /// Take the last row of `indicators` alongside an independently fetched live price
    pub fn from_indicators(indicators: &IndicatorSet, live_price: f64) -> Result<Self> {
        validate_live_price(live_price)?;

        Ok(Self {
            live_price,
            sma: indicators.latest(IndicatorKind::Sma),
            rsi: indicators.latest(IndicatorKind::Rsi),
            macd: indicators.latest(IndicatorKind::Macd),
            macd_signal: indicators.latest(IndicatorKind::MacdSignal),
            macd_hist: indicators.latest(IndicatorKind::MacdHist),
            bb_upper: indicators.latest(IndicatorKind::BbUpper),
            bb_middle: indicators.latest(IndicatorKind::BbMiddle),
            bb_lower: indicators.latest(IndicatorKind::BbLower),
            doji: indicators.latest(IndicatorKind::Doji),
            hammer: indicators.latest(IndicatorKind::Hammer),
        })
    }

    pub fn get(&self, kind: IndicatorKind) -> Option<f64> {
        match kind {
            IndicatorKind::Sma => self.sma,
            IndicatorKind::Rsi => self.rsi,
            IndicatorKind::Macd => self.macd,
            IndicatorKind::MacdSignal => self.macd_signal,
            IndicatorKind::MacdHist => self.macd_hist,
            IndicatorKind::BbUpper => self.bb_upper,
            IndicatorKind::BbMiddle => self.bb_middle,
            IndicatorKind::BbLower => self.bb_lower,
            IndicatorKind::Doji => self.doji,
            IndicatorKind::Hammer => self.hammer,
        }
    }
}

pub fn validate_live_price(live_price: f64) -> Result<()> {
    if !live_price.is_finite() || live_price <= 0.0 {
        return Err(SignalError::malformed(format!(
            "live price must be positive and finite, got {}",
            live_price
        )));
    }
    Ok(())
}

/// Outcome of one classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub signal: Signal,
    pub reason: String,
    pub report: String,
}

impl ClassificationResult {
    pub fn is_insufficient_data(&self) -> bool {
        self.signal == Signal::Hold && self.reason == INSUFFICIENT_DATA
    }
}

/// One predicate of the BUY or SELL rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub label: String,
    pub met: bool,
}

impl Condition {
    fn new(label: impl Into<String>, met: bool) -> Self {
        Self {
            label: label.into(),
            met,
        }
    }
}

/// Evaluated BUY and SELL predicate sets for one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionSet {
    pub buy: Vec<Condition>,
    pub sell: Vec<Condition>,
}

impl ConditionSet {
    pub fn buy_met(&self) -> bool {
        self.buy.iter().all(|c| c.met)
    }

    pub fn sell_met(&self) -> bool {
        self.sell.iter().all(|c| c.met)
    }

    fn count(conditions: &[Condition]) -> usize {
        conditions.iter().filter(|c| c.met).count()
    }
}

/// Stateless BUY/SELL/HOLD rule over a `LatestSnapshot`
///
/// BUY needs every one of: price above trend SMA, RSI oversold, MACD above its
/// signal line, price below the lower band, hammer detected. SELL mirrors it
/// with the opposite inequalities and a doji. Anything else is HOLD.
#[derive(Debug, Clone)]
pub struct SignalClassifier {
    config: ClassifierConfig,
    trend_period: usize,
}

impl Default for SignalClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

impl SignalClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            trend_period: 50,
        }
    }

    /// Trend SMA window, used for labels in reasons and reports
    pub fn with_trend_period(mut self, trend_period: usize) -> Self {
        self.trend_period = trend_period;
        self
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    fn required_kinds(&self) -> Vec<IndicatorKind> {
        let mut kinds = vec![
            IndicatorKind::Sma,
            IndicatorKind::Rsi,
            IndicatorKind::Macd,
            IndicatorKind::MacdSignal,
            IndicatorKind::BbLower,
            IndicatorKind::BbUpper,
        ];
        if self.config.require_patterns {
            kinds.push(IndicatorKind::Hammer);
            kinds.push(IndicatorKind::Doji);
        }
        kinds
    }

    /// Indicators the rule needs that have no value yet
    pub fn missing_indicators(&self, snapshot: &LatestSnapshot) -> Vec<IndicatorKind> {
        self.required_kinds()
            .into_iter()
            .filter(|k| snapshot.get(*k).is_none())
            .collect()
    }

    /// Evaluate both predicate sets, or `None` if a required value is missing
    pub fn evaluate_conditions(&self, snapshot: &LatestSnapshot) -> Option<ConditionSet> {
        let price = snapshot.live_price;
        let sma = snapshot.sma?;
        let rsi = snapshot.rsi?;
        let macd = snapshot.macd?;
        let macd_signal = snapshot.macd_signal?;
        let bb_lower = snapshot.bb_lower?;
        let bb_upper = snapshot.bb_upper?;
        let cfg = &self.config;
        let period = self.trend_period;

        let mut buy = vec![
            Condition::new(format!("Price>SMA{}", period), price > sma),
            Condition::new(format!("RSI<{}", cfg.rsi_oversold), rsi < cfg.rsi_oversold),
            Condition::new("MACD>Signal", macd > macd_signal),
            Condition::new("Price<LowerBand", price < bb_lower),
        ];
        let mut sell = vec![
            Condition::new(format!("Price<SMA{}", period), price < sma),
            Condition::new(format!("RSI>{}", cfg.rsi_overbought), rsi > cfg.rsi_overbought),
            Condition::new("MACD<Signal", macd < macd_signal),
            Condition::new("Price>UpperBand", price > bb_upper),
        ];

        if cfg.require_patterns {
            buy.push(Condition::new("Hammer", snapshot.hammer? != 0.0));
            sell.push(Condition::new("Doji", snapshot.doji? != 0.0));
        }

        Some(ConditionSet { buy, sell })
    }

    pub fn classify(&self, snapshot: &LatestSnapshot) -> Result<ClassificationResult> {
        validate_live_price(snapshot.live_price)?;

        let report = format_report(snapshot, self.trend_period);

        let Some(conditions) = self.evaluate_conditions(snapshot) else {
            let missing: Vec<&str> = self
                .missing_indicators(snapshot)
                .iter()
                .map(|k| k.as_str())
                .collect();
            tracing::info!(missing = ?missing, "HOLD: insufficient data");
            return Ok(ClassificationResult {
                signal: Signal::Hold,
                reason: INSUFFICIENT_DATA.to_string(),
                report,
            });
        };

        let buy_met = conditions.buy_met();
        let sell_met = conditions.sell_met();

        if buy_met && sell_met {
            tracing::error!(
                ?conditions,
                "BUY and SELL predicates both satisfied; rule table is inconsistent"
            );
        }
        debug_assert!(
            !(buy_met && sell_met),
            "BUY and SELL predicates both satisfied"
        );

        let (signal, reason) = if buy_met {
            (Signal::Buy, self.buy_reason())
        } else if sell_met {
            (Signal::Sell, self.sell_reason())
        } else {
            (Signal::Hold, NO_CONSENSUS.to_string())
        };

        tracing::info!(
            signal = %signal,
            buy_met = ConditionSet::count(&conditions.buy),
            sell_met = ConditionSet::count(&conditions.sell),
            buy = %describe(&conditions.buy),
            sell = %describe(&conditions.sell),
            "Classified snapshot"
        );

        Ok(ClassificationResult {
            signal,
            reason,
            report,
        })
    }

    fn buy_reason(&self) -> String {
        let mut reason = format!(
            "Price is above SMA{}, RSI is low (<{}), MACD crosses above signal, \
             price below lower Bollinger Band",
            self.trend_period, self.config.rsi_oversold
        );
        if self.config.require_patterns {
            reason.push_str(", and Hammer pattern detected");
        }
        reason.push('.');
        reason
    }

    fn sell_reason(&self) -> String {
        let mut reason = format!(
            "Price is below SMA{}, RSI is high (>{}), MACD crosses below signal, \
             price above upper Bollinger Band",
            self.trend_period, self.config.rsi_overbought
        );
        if self.config.require_patterns {
            reason.push_str(", and Doji pattern detected");
        }
        reason.push('.');
        reason
    }
}

fn describe(conditions: &[Condition]) -> String {
    conditions
        .iter()
        .map(|c| format!("{}={}", c.label, c.met))
        .collect::<Vec<_>>()
        .join(" ")
}
