use anyhow::{Context, Result};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use crate::config::MarketConfig;
use crate::models::PriceSeries;

// Type alias for the rate limiter to simplify signatures
type CoinGeckoRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// CoinGecko API client with rate limiting and retries
///
/// This struct is cloneable to allow sharing across async tasks.
/// All clones share the same rate limiter.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    max_retries: u32,
    retry_backoff: Duration,
    rate_limiter: Arc<CoinGeckoRateLimiter>,
}

/// Response from /coins/{id}/market_chart endpoint
#[derive(Debug, Deserialize)]
pub struct MarketChartData {
    pub prices: Vec<[f64; 2]>, // [timestamp_ms, price]
}

impl MarketChartData {
    /// Validate the price column into a series
    pub fn into_price_series(self) -> Result<PriceSeries> {
        PriceSeries::from_millis_pairs(&self.prices).context("Market chart contained invalid prices")
    }
}

/// Response from /simple/price: `{"bitcoin": {"usd": 64000.0}}`
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

impl CoinGeckoClient {
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let per_minute = NonZeroU32::new(config.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            max_retries: config.max_retries.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            rate_limiter,
        })
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff * 2u32.saturating_pow(attempt.saturating_sub(1))
    }

    /// Make a rate-limited API request with retry logic
    async fn make_request(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut params: Vec<(&str, String)> = query.to_vec();
        if let Some(key) = &self.api_key {
            params.push(("x_cg_demo_api_key", key.clone()));
        }

        for attempt in 1..=self.max_retries {
            // Wait for rate limiter
            self.rate_limiter.until_ready().await;

            match self.client.get(&url).query(&params).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response);
                    }

                    // Rate limited or server error: back off and retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        if attempt == self.max_retries {
                            anyhow::bail!(
                                "CoinGecko API error ({}) after {} attempts",
                                status,
                                self.max_retries
                            );
                        }
                        let backoff = self.backoff(attempt);
                        tracing::warn!(
                            "CoinGecko returned {}, retrying in {:?} (attempt {}/{})",
                            status,
                            backoff,
                            attempt,
                            self.max_retries
                        );
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    // Other errors (4xx) - don't retry
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    anyhow::bail!("CoinGecko API error ({}): {}", status, error_text);
                }
                Err(e) if attempt < self.max_retries => {
                    let backoff = self.backoff(attempt);
                    tracing::warn!(
                        "Network error: {}, retrying in {:?} (attempt {}/{})",
                        e,
                        backoff,
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => anyhow::bail!("Network error after {} retries: {}", self.max_retries, e),
            }
        }

        anyhow::bail!("Failed after {} retries", self.max_retries)
    }

    /// Fetch the market chart price series
    pub async fn get_market_chart(
        &self,
        coin_id: &str,
        vs_currency: &str,
        days: u32,
        interval: &str,
    ) -> Result<MarketChartData> {
        let mut query = vec![
            ("vs_currency", vs_currency.to_string()),
            ("days", days.to_string()),
        ];
        if !interval.is_empty() {
            query.push(("interval", interval.to_string()));
        }

        tracing::debug!("Fetching market chart for {} ({}d)", coin_id, days);

        let response = self
            .make_request(&format!("/coins/{}/market_chart", coin_id), &query)
            .await?;

        let data: MarketChartData = response
            .json()
            .await
            .context("Failed to parse market chart")?;

        tracing::debug!("Fetched {} price points for {}", data.prices.len(), coin_id);

        Ok(data)
    }

    /// Fetch historical prices as a validated series
    pub async fn get_price_series(&self, config: &MarketConfig) -> Result<PriceSeries> {
        self.get_market_chart(
            &config.coin_id,
            &config.vs_currency,
            config.days,
            &config.interval,
        )
        .await?
        .into_price_series()
    }

    /// Fetch the current price of one coin
    pub async fn get_live_price(&self, coin_id: &str, vs_currency: &str) -> Result<f64> {
        let query = [
            ("ids", coin_id.to_string()),
            ("vs_currencies", vs_currency.to_string()),
        ];

        let response = self.make_request("/simple/price", &query).await?;

        let data: SimplePriceResponse = response
            .json()
            .await
            .context("Failed to parse simple price")?;

        let price = data
            .get(coin_id)
            .and_then(|prices| prices.get(vs_currency))
            .copied()
            .with_context(|| format!("No {} price for {} in response", vs_currency, coin_id))?;

        tracing::debug!(coin = coin_id, price, "Fetched live price");

        Ok(price)
    }
}
