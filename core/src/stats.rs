//! Distribution summaries and percentile calculation
//!
//! Every statistic is an `Option<f64>`: `None` means "undefined"
//! (empty or insufficient sample) and propagates through any derived
//! computation. Undefined values are never coerced to zero.

use serde::{Deserialize, Serialize};

/// Arithmetic mean, undefined for an empty sample
pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    Some(xs.iter().sum::<f64>() / xs.len() as f64)
}

/// Sample standard deviation (n−1 denominator)
///
/// Returns 0.0 for fewer than two points. Single-point and
/// empty-after-deltas samples are common and must not poison a
/// downstream coefficient of variation unless the mean itself is
/// undefined or zero.
pub fn stddev(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    // mean() is Some here, xs is nonempty
    let m = mean(xs).unwrap_or(0.0);
    let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    var.sqrt()
}

/// Coefficient of variation (stddev/mean)
///
/// Undefined for an empty sample or a zero mean.
pub fn coeff_var(xs: &[f64]) -> Option<f64> {
    let m = mean(xs)?;
    if m == 0.0 {
        return None;
    }
    Some(stddev(xs) / m)
}

/// Percentile with linear interpolation between order statistics
///
/// `p` is in [0, 100]: `p <= 0` returns the minimum, `p >= 100` the
/// maximum. Undefined for an empty sample.
pub fn percentile(xs: &[f64], p: f64) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }

    let mut ys: Vec<f64> = xs.to_vec();
    ys.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    if p <= 0.0 {
        return Some(ys[0]);
    }
    if p >= 100.0 {
        return Some(ys[ys.len() - 1]);
    }

    let k = (ys.len() - 1) as f64 * (p / 100.0);
    let f = k.floor() as usize;
    let c = k.ceil() as usize;
    if f == c {
        return Some(ys[f]);
    }
    let d0 = ys[f] * (c as f64 - k);
    let d1 = ys[c] * (k - f as f64);
    Some(d0 + d1)
}

/// Summary of a numeric sample's distribution
///
/// If `n == 0` every statistic is `None`. Percentiles are monotonic
/// (`p50 <= p90 <= p99`) for any nonempty sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistSummary {
    /// Sample size
    pub n: usize,
    /// Arithmetic mean
    pub mean: Option<f64>,
    /// 50th percentile (median)
    pub p50: Option<f64>,
    /// 90th percentile
    pub p90: Option<f64>,
    /// 99th percentile
    pub p99: Option<f64>,
    /// Minimum value
    pub min: Option<f64>,
    /// Maximum value
    pub max: Option<f64>,
}

impl DistSummary {
    /// Summary of an empty sample: all statistics undefined
    pub fn empty() -> Self {
        Self {
            n: 0,
            mean: None,
            p50: None,
            p90: None,
            p99: None,
            min: None,
            max: None,
        }
    }

    /// Build a summary from an unordered sample
    pub fn from_sample(xs: &[f64]) -> Self {
        if xs.is_empty() {
            return Self::empty();
        }

        let mut sorted: Vec<f64> = xs.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        Self {
            n: sorted.len(),
            mean: mean(&sorted),
            p50: percentile(&sorted, 50.0),
            p90: percentile(&sorted, 90.0),
            p99: percentile(&sorted, 99.0),
            min: Some(sorted[0]),
            max: Some(sorted[sorted.len() - 1]),
        }
    }
}
