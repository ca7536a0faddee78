// Signal strategy module
pub mod consensus;
pub mod report;
pub mod signals;

pub use consensus::ConsensusStrategy;
pub use report::{format_report, parse_report_field};
pub use signals::{
    ClassificationResult, ClassifierConfig, Condition, ConditionSet, LatestSnapshot,
    SignalClassifier, INSUFFICIENT_DATA, NO_CONSENSUS,
};

use crate::models::PriceSeries;
use crate::Result;

/// Base trait for signal strategies
pub trait Strategy: Send + Sync {
    /// Classify the latest state of `series` against an independently fetched live price
    fn evaluate(&self, series: &PriceSeries, live_price: f64) -> Result<ClassificationResult>;

    /// Get strategy name
    fn name(&self) -> &str;

    /// Samples needed before every indicator has a latest value
    fn min_samples_required(&self) -> usize;
}
