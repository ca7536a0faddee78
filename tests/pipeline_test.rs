use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use signalbot::indicators::{IndicatorEngine, IndicatorKind};
use signalbot::strategy::{
    parse_report_field, ClassifierConfig, ConsensusStrategy, LatestSnapshot, SignalClassifier,
    Strategy,
};
use signalbot::{PriceSample, PriceSeries, Signal};

fn series_from(prices: &[f64]) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let samples = prices
        .iter()
        .enumerate()
        .map(|(i, p)| PriceSample::new(start + Duration::days(i as i64), *p))
        .collect();
    PriceSeries::new(samples).unwrap()
}

fn random_prices(rng: &mut StdRng, n: usize) -> Vec<f64> {
    let mut price: f64 = rng.gen_range(10.0..1000.0);
    (0..n)
        .map(|_| {
            price = (price * (1.0 + rng.gen_range(-0.05..0.05))).max(0.01);
            price
        })
        .collect()
}

fn random_option(rng: &mut StdRng, low: f64, high: f64) -> Option<f64> {
    Some(rng.gen_range(low..high))
}

fn random_flag(rng: &mut StdRng) -> Option<f64> {
    Some(if rng.gen_bool(0.5) { 100.0 } else { 0.0 })
}

fn random_snapshot(rng: &mut StdRng) -> LatestSnapshot {
    LatestSnapshot {
        live_price: rng.gen_range(1.0..200.0),
        sma: random_option(rng, 1.0, 200.0),
        rsi: random_option(rng, 0.0, 100.0),
        macd: random_option(rng, -5.0, 5.0),
        macd_signal: random_option(rng, -5.0, 5.0),
        macd_hist: random_option(rng, -5.0, 5.0),
        bb_upper: random_option(rng, 1.0, 200.0),
        bb_middle: random_option(rng, 1.0, 200.0),
        bb_lower: random_option(rng, 1.0, 200.0),
        doji: random_flag(rng),
        hammer: random_flag(rng),
    }
}

#[test]
fn test_alignment_invariant() {
    let mut rng = StdRng::seed_from_u64(7);
    let engine = IndicatorEngine::default();

    for n in 1..=150 {
        let set = engine.compute(&series_from(&random_prices(&mut rng, n)));

        let expected_first = |kind: IndicatorKind| match kind {
            IndicatorKind::Sma => 49,
            IndicatorKind::Rsi => 13,
            IndicatorKind::Macd => 25,
            IndicatorKind::MacdSignal | IndicatorKind::MacdHist => 33,
            IndicatorKind::BbUpper | IndicatorKind::BbMiddle | IndicatorKind::BbLower => 19,
            IndicatorKind::Doji | IndicatorKind::Hammer => 0,
        };

        for (kind, values) in set.iter() {
            assert_eq!(values.len(), n, "{} has wrong length for n={}", kind, n);
            let first = expected_first(kind);
            for (i, value) in values.iter().enumerate() {
                assert_eq!(
                    value.is_some(),
                    i >= first,
                    "{} at position {} (n={}) should be {}",
                    kind,
                    i,
                    n,
                    if i >= first { "defined" } else { "undefined" }
                );
            }
        }
    }
}

#[test]
fn test_classifier_idempotent() {
    let mut rng = StdRng::seed_from_u64(11);
    let classifier = SignalClassifier::default();

    for _ in 0..200 {
        let snapshot = random_snapshot(&mut rng);
        let first = classifier.classify(&snapshot).unwrap();
        let second = classifier.classify(&snapshot).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.report.as_bytes(), second.report.as_bytes());
    }
}

#[test]
fn test_buy_and_sell_mutually_exclusive() {
    let mut rng = StdRng::seed_from_u64(42);
    let classifiers = [
        SignalClassifier::default(),
        SignalClassifier::new(ClassifierConfig {
            require_patterns: false,
            ..Default::default()
        }),
    ];

    for _ in 0..20_000 {
        let snapshot = random_snapshot(&mut rng);
        for classifier in &classifiers {
            let conditions = classifier
                .evaluate_conditions(&snapshot)
                .expect("random snapshot has every value");
            assert!(
                !(conditions.buy_met() && conditions.sell_met()),
                "both BUY and SELL satisfied by {:?}",
                snapshot
            );
        }
    }
}

#[test]
fn test_short_history_always_insufficient() {
    let mut rng = StdRng::seed_from_u64(3);
    let strategy = ConsensusStrategy::default();

    for n in 1..50 {
        let series = series_from(&random_prices(&mut rng, n));
        for _ in 0..5 {
            let live_price = rng.gen_range(0.01..100_000.0);
            let result = strategy.evaluate(&series, live_price).unwrap();
            assert_eq!(result.signal, Signal::Hold);
            assert_eq!(result.reason, "insufficient data", "n={}", n);
            assert!(result.is_insufficient_data());
        }
    }
}

#[test]
fn test_rising_series_below_bands_holds() {
    let prices: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
    let series = series_from(&prices);
    let strategy = ConsensusStrategy::default();

    let set = strategy.indicators(&series);
    let rsi = set.latest(IndicatorKind::Rsi).unwrap();
    let lower = set.latest(IndicatorKind::BbLower).unwrap();
    assert!(rsi > 70.0, "rising series should be overbought, got {}", rsi);

    for live_price in [lower * 0.99, lower * 0.5] {
        let result = strategy.evaluate(&series, live_price).unwrap();
        assert_eq!(result.signal, Signal::Hold);
        assert!(!result.is_insufficient_data());
    }

    // Same outcome with pattern confirmation switched off
    let relaxed = ConsensusStrategy::new(
        Default::default(),
        ClassifierConfig {
            require_patterns: false,
            ..Default::default()
        },
    )
    .unwrap();
    let result = relaxed.evaluate(&series, lower * 0.99).unwrap();
    assert_ne!(result.signal, Signal::Buy);
}

#[test]
fn test_flat_series() {
    let series = series_from(&[100.0; 100]);
    let set = IndicatorEngine::default().compute(&series);

    for (i, value) in set.sma.iter().enumerate() {
        if i >= 49 {
            assert_eq!(*value, Some(100.0));
        } else {
            assert_eq!(*value, None);
        }
    }

    // No gains and no losses is neutral, never a division by zero
    for value in set.rsi.iter().skip(13) {
        assert_eq!(*value, Some(50.0));
    }

    for i in 19..100 {
        assert_eq!(set.bb_upper[i], Some(100.0));
        assert_eq!(set.bb_middle[i], Some(100.0));
        assert_eq!(set.bb_lower[i], Some(100.0));
    }

    let result = ConsensusStrategy::default().evaluate(&series, 100.0).unwrap();
    assert_eq!(result.signal, Signal::Hold);
    assert_eq!(result.reason, "no clear consensus across indicators");
}

#[test]
fn test_non_positive_live_price_is_malformed() {
    let series = series_from(&[100.0; 60]);
    let strategy = ConsensusStrategy::default();
    let set = strategy.indicators(&series);

    for live_price in [0.0, -0.01, -250.0] {
        let err = strategy.evaluate(&series, live_price).unwrap_err();
        assert!(err.is_malformed_input());

        let err = LatestSnapshot::from_indicators(&set, live_price).unwrap_err();
        assert!(err.is_malformed_input());
    }
}

#[test]
fn test_report_round_trip() {
    let mut rng = StdRng::seed_from_u64(99);
    let classifier = SignalClassifier::default();

    for _ in 0..500 {
        let snapshot = random_snapshot(&mut rng);
        let result = classifier.classify(&snapshot).unwrap();

        assert_eq!(
            parse_report_field(&result.report, "Live Price"),
            Some(snapshot.live_price)
        );
        assert_eq!(parse_report_field(&result.report, "SMA 50"), snapshot.sma);
        assert_eq!(parse_report_field(&result.report, "RSI"), snapshot.rsi);
        assert_eq!(parse_report_field(&result.report, "Upper"), snapshot.bb_upper);
    }
}

#[test]
fn test_report_field_order_is_stable() {
    let series = series_from(&[100.0; 60]);
    let result = ConsensusStrategy::default().evaluate(&series, 101.5).unwrap();

    let labels: Vec<&str> = result
        .report
        .lines()
        .map(|line| line.split(':').next().unwrap_or_default())
        .collect();
    assert_eq!(
        labels,
        vec![
            "Live Price",
            "SMA 50",
            "RSI",
            "MACD",
            "Bollinger Bands",
            "Doji Pattern",
            "Hammer Pattern"
        ]
    );
}

#[test]
fn test_flat_candles_degenerate_patterns() {
    // A single-price source yields flat candles: doji always, hammer never
    let mut rng = StdRng::seed_from_u64(5);
    let set = IndicatorEngine::default().compute(&series_from(&random_prices(&mut rng, 80)));
    assert!(set.doji.iter().all(|v| *v == Some(100.0)));
    assert!(set.hammer.iter().all(|v| *v == Some(0.0)));
}
