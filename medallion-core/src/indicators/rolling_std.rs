//! Rolling sample standard deviation.
//!
//! out[t] = stddev(values[t-window+1..=t]) with Bessel's correction (divide
//! by N-1). Any NaN inside the window makes the output NaN, so a series whose
//! first element is a warmup NaN gets its first value one position later.
//! Lookback: window - 1.

use super::SeriesIndicator;

#[derive(Debug, Clone)]
pub struct RollingStd {
    window: usize,
    name: String,
}

impl RollingStd {
    pub fn new(window: usize, name: impl Into<String>) -> Self {
        assert!(window >= 2, "sample stddev window must be >= 2");
        Self {
            window,
            name: name.into(),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for RollingStd {
    fn default() -> Self {
        Self::new(7, "volatility")
    }
}

impl SeriesIndicator for RollingStd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window - 1
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        let n = values.len();
        let mut result = vec![f64::NAN; n];

        if n < self.window {
            return result;
        }

        for i in (self.window - 1)..n {
            let window = &values[(i + 1 - self.window)..=i];
            if window.iter().any(|v| !v.is_finite()) {
                continue;
            }

            let mean = window.iter().sum::<f64>() / self.window as f64;
            let variance = window
                .iter()
                .map(|v| {
                    let diff = v - mean;
                    diff * diff
                })
                .sum::<f64>()
                / (self.window - 1) as f64;

            result[i] = variance.sqrt();
        }

        result
    }
}
