use super::signals::{
    validate_live_price, ClassificationResult, ClassifierConfig, LatestSnapshot, SignalClassifier,
};
use super::Strategy;
use crate::indicators::{IndicatorConfig, IndicatorEngine, IndicatorSet};
use crate::models::PriceSeries;
use crate::Result;

/// Multi-indicator consensus strategy
///
/// Every indicator must agree before a BUY or SELL is issued:
/// - SMA for trend direction
/// - RSI for overbought/oversold conditions
/// - MACD against its signal line
/// - Bollinger Bands for price extremes
/// - Hammer / doji candlestick confirmation (optional)
#[derive(Debug, Clone)]
pub struct ConsensusStrategy {
    engine: IndicatorEngine,
    classifier: SignalClassifier,
}

impl ConsensusStrategy {
    pub fn new(indicators: IndicatorConfig, classifier: ClassifierConfig) -> Result<Self> {
        classifier.validate()?;
        let trend_period = indicators.sma_period;
        Ok(Self {
            engine: IndicatorEngine::new(indicators)?,
            classifier: SignalClassifier::new(classifier).with_trend_period(trend_period),
        })
    }

    pub fn engine(&self) -> &IndicatorEngine {
        &self.engine
    }

    pub fn classifier(&self) -> &SignalClassifier {
        &self.classifier
    }

    /// Full indicator series for `series`, for inspection
    pub fn indicators(&self, series: &PriceSeries) -> IndicatorSet {
        self.engine.compute(series)
    }
}

impl Default for ConsensusStrategy {
    fn default() -> Self {
        Self {
            engine: IndicatorEngine::default(),
            classifier: SignalClassifier::default(),
        }
    }
}

impl Strategy for ConsensusStrategy {
    fn evaluate(&self, series: &PriceSeries, live_price: f64) -> Result<ClassificationResult> {
        // Fail before any indicator work
        validate_live_price(live_price)?;

        let indicators = self.engine.compute(series);
        let snapshot = LatestSnapshot::from_indicators(&indicators, live_price)?;

        self.classifier.classify(&snapshot)
    }

    fn name(&self) -> &str {
        "ConsensusStrategy"
    }

    fn min_samples_required(&self) -> usize {
        self.engine.config().min_samples_required()
    }
}
