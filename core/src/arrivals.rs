//! Arrival-pattern analysis
//!
//! Consumes request arrival timestamps (millisecond offsets) and
//! produces rate and burstiness statistics plus a coarse pattern
//! classification.

use serde::{Deserialize, Serialize};

use crate::stats::{coeff_var, DistSummary};

/// Floor for the trace duration, so a single-instant trace still has
/// a finite request rate.
const MIN_DURATION_S: f64 = 1e-9;

/// Arrival pattern classification
///
/// Total over all inputs and mutually exclusive. The variants render
/// with the labels used in reports and diffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalPattern {
    /// No inter-arrival data to classify
    Unknown,
    /// Low variation: regular, batch-like spacing
    Smooth,
    /// Moderate variation: roughly Poisson arrivals
    Mixed,
    /// High variation: clustered, interactive-like arrivals
    Bursty,
}

impl std::fmt::Display for ArrivalPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArrivalPattern::Unknown => write!(f, "unknown"),
            ArrivalPattern::Smooth => write!(f, "smooth / batch-like"),
            ArrivalPattern::Mixed => write!(f, "mixed / poisson-ish"),
            ArrivalPattern::Bursty => write!(f, "bursty / interactive-like"),
        }
    }
}

/// Rate and burstiness statistics over a trace's arrival timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalStats {
    /// Number of arrivals
    pub n: usize,
    /// Trace duration in seconds (max − min arrival, floored at epsilon)
    pub duration_s: Option<f64>,
    /// Mean requests per second over the trace duration
    pub mean_rps: Option<f64>,
    /// Peak arrivals in any 1-second bucket
    pub peak_rps_1s: Option<f64>,
    /// Distribution of consecutive inter-arrival gaps (milliseconds)
    pub interarrival_ms: DistSummary,
    /// Coefficient of variation of inter-arrival gaps
    pub burstiness_cv: Option<f64>,
    /// Classification derived from `burstiness_cv`
    pub pattern: ArrivalPattern,
}

impl ArrivalStats {
    fn empty() -> Self {
        Self {
            n: 0,
            duration_s: None,
            mean_rps: None,
            peak_rps_1s: None,
            interarrival_ms: DistSummary::empty(),
            burstiness_cv: None,
            pattern: ArrivalPattern::Unknown,
        }
    }
}

/// Classification rules, evaluated top-down; first satisfied wins.
/// The rule order and boundaries are part of the observable contract.
fn classify(cv: Option<f64>) -> ArrivalPattern {
    match cv {
        None => ArrivalPattern::Unknown,
        Some(cv) if cv < 0.8 => ArrivalPattern::Smooth,
        Some(cv) if cv < 1.5 => ArrivalPattern::Mixed,
        Some(_) => ArrivalPattern::Bursty,
    }
}

/// Analyze a trace's arrival timestamps (millisecond offsets)
///
/// An empty input yields all-undefined statistics and the `Unknown`
/// pattern; degenerate inputs (single arrival, all-identical
/// timestamps) never fail.
pub fn analyze_arrivals(arrival_ms: &[i64]) -> ArrivalStats {
    if arrival_ms.is_empty() {
        return ArrivalStats::empty();
    }

    let mut ts: Vec<i64> = arrival_ms.to_vec();
    ts.sort_unstable();
    let n = ts.len();

    let duration_ms = (ts[n - 1] - ts[0]).max(0);
    let duration_s = (duration_ms as f64 / 1000.0).max(MIN_DURATION_S);
    let mean_rps = n as f64 / duration_s;

    let deltas: Vec<f64> = ts.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
    let interarrival_ms = DistSummary::from_sample(&deltas);
    let cv = coeff_var(&deltas);

    // Peak arrivals per second: bucket = floor((t - t0)/1000)
    let t0 = ts[0];
    let mut counts: std::collections::HashMap<i64, usize> = std::collections::HashMap::new();
    for t in &ts {
        *counts.entry((t - t0) / 1000).or_insert(0) += 1;
    }
    let peak = counts.values().max().copied().map(|c| c as f64);

    ArrivalStats {
        n,
        duration_s: Some(duration_s),
        mean_rps: Some(mean_rps),
        peak_rps_1s: peak,
        interarrival_ms,
        burstiness_cv: cv,
        pattern: classify(cv),
    }
}
