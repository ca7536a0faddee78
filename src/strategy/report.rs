//! Fixed-order indicator status report.
//!
//! Field order and labels are stable; numbers use the shortest representation
//! that parses back to the same `f64`.

use super::signals::LatestSnapshot;

const MISSING: &str = "n/a";

fn fmt_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:?}", v),
        None => MISSING.to_string(),
    }
}

/// Render the snapshot as:
///
/// ```text
/// Live Price: 64000.5
/// SMA 50: 61234.25
/// RSI: 55.1
/// MACD: 120.5, Signal Line: 98.25
/// Bollinger Bands: Lower: 60000.0, Upper: 66000.0
/// Doji Pattern: 100.0
/// Hammer Pattern: 0.0
/// ```
pub fn format_report(snapshot: &LatestSnapshot, trend_period: usize) -> String {
    let mut report = String::new();
    report.push_str(&format!("Live Price: {:?}\n", snapshot.live_price));
    report.push_str(&format!("SMA {}: {}\n", trend_period, fmt_value(snapshot.sma)));
    report.push_str(&format!("RSI: {}\n", fmt_value(snapshot.rsi)));
    report.push_str(&format!(
        "MACD: {}, Signal Line: {}\n",
        fmt_value(snapshot.macd),
        fmt_value(snapshot.macd_signal)
    ));
    report.push_str(&format!(
        "Bollinger Bands: Lower: {}, Upper: {}\n",
        fmt_value(snapshot.bb_lower),
        fmt_value(snapshot.bb_upper)
    ));
    report.push_str(&format!("Doji Pattern: {}\n", fmt_value(snapshot.doji)));
    report.push_str(&format!("Hammer Pattern: {}\n", fmt_value(snapshot.hammer)));
    report
}

/// Read one numeric field back out of a report.
///
/// `label` is the text before the colon, e.g. `"Live Price"`, `"SMA 50"`,
/// `"Signal Line"` or `"Lower"`. Returns `None` when the field is absent or
/// rendered as `n/a`.
pub fn parse_report_field(report: &str, label: &str) -> Option<f64> {
    report
        .lines()
        .flat_map(|line| line.split(", "))
        .filter_map(|segment| segment.rsplit_once(": "))
        .find(|(key, _)| *key == label || key.ends_with(&format!(": {}", label)))
        .and_then(|(_, value)| value.trim().parse::<f64>().ok())
}
