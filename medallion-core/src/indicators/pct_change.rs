//! Percentage change between consecutive values.
//!
//! out[t] = values[t] / values[t-1] - 1. Index 0 has no predecessor.
//! A zero predecessor yields NaN rather than an infinity.
//! Lookback: 1.

use super::SeriesIndicator;

#[derive(Debug, Clone)]
pub struct PctChange {
    name: String,
}

impl PctChange {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for PctChange {
    fn default() -> Self {
        Self::new("daily_return")
    }
}

impl SeriesIndicator for PctChange {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        let mut result = vec![f64::NAN; values.len()];

        for (i, pair) in values.windows(2).enumerate() {
            let (prev, curr) = (pair[0], pair[1]);
            if prev == 0.0 || prev.is_nan() || curr.is_nan() {
                continue;
            }
            result[i + 1] = (curr - prev) / prev;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn first_value_is_undefined() {
        let result = PctChange::default().compute(&[100.0, 110.0]);
        assert!(result[0].is_nan());
        assert_approx(result[1], 0.10, DEFAULT_EPSILON);
    }

    #[test]
    fn matches_ratio_minus_one() {
        let closes = [50.0, 55.0, 44.0, 44.0, 88.0];
        let result = PctChange::default().compute(&closes);
        for i in 1..closes.len() {
            assert_approx(result[i], closes[i] / closes[i - 1] - 1.0, DEFAULT_EPSILON);
        }
        assert_approx(result[3], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_predecessor_is_undefined() {
        let result = PctChange::default().compute(&[0.0, 5.0, 10.0]);
        assert!(result[1].is_nan());
        assert_approx(result[2], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn nan_propagation() {
        let result = PctChange::default().compute(&[1.0, f64::NAN, 2.0, 4.0]);
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_approx(result[3], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn empty_and_single() {
        assert!(PctChange::default().compute(&[]).is_empty());
        let single = PctChange::default().compute(&[42.0]);
        assert_eq!(single.len(), 1);
        assert!(single[0].is_nan());
    }
}
