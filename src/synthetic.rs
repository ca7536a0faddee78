use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::SignalError;
use crate::models::{PriceSample, PriceSeries};
use crate::Result;

/// Market scenario types for synthetic price generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarketScenario {
    /// Steady uptrend with noise (+2% per sample average)
    Uptrend,
    /// Steady downtrend with noise (-2% per sample average)
    Downtrend,
    /// Sideways/choppy market (±1% around mean)
    Sideways,
    /// High volatility (±5% large swings)
    Volatile,
}

/// Generates reproducible price series for offline runs
pub struct SyntheticPriceGenerator {
    rng: StdRng,
    base_price: f64,
}

impl SyntheticPriceGenerator {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_price: 150.0,
        }
    }

    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = base_price;
        self
    }

    /// Generate `num_samples` prices spaced `interval` apart, ending now
    pub fn generate(
        &mut self,
        scenario: MarketScenario,
        num_samples: usize,
        interval: Duration,
    ) -> Result<PriceSeries> {
        let span = i32::try_from(num_samples)
            .ok()
            .and_then(|n| interval.checked_mul(n))
            .ok_or_else(|| {
                SignalError::malformed(format!(
                    "{} samples of {} do not fit in a time span",
                    num_samples, interval
                ))
            })?;
        let start_time = Utc::now()
            .checked_sub_signed(span)
            .ok_or_else(|| SignalError::malformed("synthetic start time out of range"))?;
        self.generate_from(scenario, start_time, num_samples, interval)
    }

    pub fn generate_from(
        &mut self,
        scenario: MarketScenario,
        start_time: DateTime<Utc>,
        num_samples: usize,
        interval: Duration,
    ) -> Result<PriceSeries> {
        let floor = self.base_price * 0.05;
        let mean_price = self.base_price;
        let mut current_price = self.base_price;
        let mut samples = Vec::with_capacity(num_samples);
        let mut timestamp = start_time;

        for _ in 0..num_samples {
            let change = match scenario {
                MarketScenario::Uptrend => {
                    current_price * (0.02 + self.rng.gen_range(-0.01..0.01))
                }
                MarketScenario::Downtrend => {
                    current_price * (-0.02 + self.rng.gen_range(-0.01..0.01))
                }
                MarketScenario::Sideways => {
                    // Mean reversion force + noise
                    (mean_price - current_price) * 0.1
                        + current_price * self.rng.gen_range(-0.01..0.01)
                }
                MarketScenario::Volatile => current_price * self.rng.gen_range(-0.05..0.05),
            };

            // Prevent price from going too low
            current_price = (current_price + change).max(floor);

            if !samples.is_empty() {
                timestamp = timestamp
                    .checked_add_signed(interval)
                    .ok_or_else(|| SignalError::malformed("synthetic timestamp out of range"))?;
            }
            samples.push(PriceSample::new(timestamp, current_price));
        }

        PriceSeries::new(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_uptrend() {
        let mut gen = SyntheticPriceGenerator::new(42);
        let series = gen
            .generate(MarketScenario::Uptrend, 100, Duration::days(1))
            .unwrap();

        assert_eq!(series.len(), 100);

        let first_price = series.samples()[0].price;
        let last_price = series.last().price;
        assert!(
            last_price > first_price,
            "Uptrend should end higher: {} -> {}",
            first_price,
            last_price
        );
    }

    #[test]
    fn test_generate_downtrend() {
        let mut gen = SyntheticPriceGenerator::new(42);
        let series = gen
            .generate(MarketScenario::Downtrend, 100, Duration::days(1))
            .unwrap();

        let first_price = series.samples()[0].price;
        let last_price = series.last().price;
        assert!(
            last_price < first_price,
            "Downtrend should end lower: {} -> {}",
            first_price,
            last_price
        );
    }

    #[test]
    fn test_generate_sideways() {
        let mut gen = SyntheticPriceGenerator::new(42);
        let series = gen
            .generate(MarketScenario::Sideways, 200, Duration::days(1))
            .unwrap();

        // Should stay roughly around base price (±10%)
        for sample in series.samples() {
            assert!(
                sample.price > 135.0 && sample.price < 165.0,
                "Sideways should stay near base: {}",
                sample.price
            );
        }
    }

    #[test]
    fn test_same_seed_same_prices() {
        let start = Utc::now();
        let a = SyntheticPriceGenerator::new(7)
            .generate_from(MarketScenario::Volatile, start, 50, Duration::hours(1))
            .unwrap();
        let b = SyntheticPriceGenerator::new(7)
            .generate_from(MarketScenario::Volatile, start, 50, Duration::hours(1))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_prices_stay_positive() {
        let mut gen = SyntheticPriceGenerator::new(1).with_base_price(10.0);
        let series = gen
            .generate(MarketScenario::Downtrend, 500, Duration::minutes(5))
            .unwrap();
        assert!(series.samples().iter().all(|s| s.price >= 0.5));
    }

    #[test]
    fn test_oversized_span_rejected() {
        let mut gen = SyntheticPriceGenerator::new(3);
        let err = gen
            .generate(MarketScenario::Sideways, usize::MAX, Duration::days(1))
            .unwrap_err();
        assert!(err.is_malformed_input());

        let err = gen
            .generate(MarketScenario::Sideways, 10, Duration::days(100_000_000))
            .unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_timestamps_spaced_by_interval() {
        let start = Utc::now();
        let series = SyntheticPriceGenerator::new(9)
            .generate_from(MarketScenario::Uptrend, start, 5, Duration::hours(4))
            .unwrap();
        for (i, sample) in series.samples().iter().enumerate() {
            assert_eq!(sample.timestamp, start + Duration::hours(4 * i as i64));
        }
    }
}
