use anyhow::{Context, Result};

use crate::api::CoinGeckoClient;
use crate::config::MarketConfig;
use crate::models::PriceSeries;
use crate::strategy::{ClassificationResult, Strategy};

pub const WELCOME_MESSAGE: &str = "Welcome to the Signal Bot!\n\n\
Use `signalbot signal` to get the latest buy/sell signal based on indicators such as:\n\
- SMA, RSI, MACD\n\
- Bollinger Bands\n\
- Candlestick patterns (Doji, Hammer)";

/// Shown to the operator when a round fails; details go to the log
pub const GENERIC_ERROR_MESSAGE: &str = "Error fetching or analyzing data.";

/// Fetches market data and runs a strategy over it, once per call
pub struct SignalService<S: Strategy> {
    client: CoinGeckoClient,
    market: MarketConfig,
    strategy: S,
}

impl<S: Strategy> SignalService<S> {
    pub fn new(client: CoinGeckoClient, market: MarketConfig, strategy: S) -> Self {
        Self {
            client,
            market,
            strategy,
        }
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Fetch history and live price, then classify
    pub async fn run_once(&self) -> Result<ClassificationResult> {
        let (series, live_price) = tokio::try_join!(
            self.client.get_price_series(&self.market),
            self.client
                .get_live_price(&self.market.coin_id, &self.market.vs_currency),
        )?;

        if series.len() < self.strategy.min_samples_required() {
            tracing::warn!(
                samples = series.len(),
                needed = self.strategy.min_samples_required(),
                "Price history shorter than the slowest indicator window"
            );
        }

        self.evaluate(&series, live_price)
    }

    /// Classify already-fetched data
    pub fn evaluate(&self, series: &PriceSeries, live_price: f64) -> Result<ClassificationResult> {
        let result = self
            .strategy
            .evaluate(series, live_price)
            .with_context(|| {
                format!(
                    "{} failed to classify {}",
                    self.strategy.name(),
                    self.market.coin_id
                )
            })?;

        tracing::info!(
            coin = %self.market.coin_id,
            signal = %result.signal,
            live_price,
            "Signal computed"
        );

        Ok(result)
    }
}

/// Operator-facing text for one result
pub fn render_message(result: &ClassificationResult) -> String {
    format!(
        "Signal: {}\nReason: {}\n\nIndicator Status:\n{}",
        result.signal, result.reason, result.report
    )
}
