//! Series indicators used by the gold layer.
//!
//! Indicators are pure functions: a numeric series in, a series of the same
//! length out. Positions without enough history are `f64::NAN` (warmup), and
//! a NaN input poisons every output whose window covers it.
//!
//! No output at index t may depend on input from t+1 or later.

pub mod pct_change;
pub mod rolling_std;

pub use pct_change::PctChange;
pub use rolling_std::RollingStd;

/// Trait for series indicators.
pub trait SeriesIndicator: Send + Sync {
    /// Column name of the output series (e.g. "daily_return").
    fn name(&self) -> &str;

    /// Number of leading positions that are always NaN.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the full series.
    ///
    /// Returns a `Vec<f64>` of the same length as `values`.
    fn compute(&self, values: &[f64]) -> Vec<f64>;
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-12;
