//! Summary comparison: full field-by-field diff, thresholded core
//! diff, and regression checks
//!
//! The full diff is comprehensive by design: its fixed, ordered
//! metric list is always present and undefined operands render as
//! `"n/a"`. The core diff is selective: a row is emitted only when
//! both operands are defined, so an undefined value can never produce
//! a false "no regression" or false "regression" signal.

use serde::{Deserialize, Serialize};

use crate::classify::{direction_hint, primary_class};
use crate::summary::WorkloadSummary;

/// Denominator floor for relative deltas
const EPS: f64 = 1e-9;

// ============================================================================
// Formatting helpers
// ============================================================================

/// Fixed-precision number, `"n/a"` when undefined
pub(crate) fn fmt_num(x: Option<f64>, decimals: usize) -> String {
    match x {
        Some(v) => format!("{v:.decimals$}"),
        None => "n/a".to_string(),
    }
}

/// Rounded integer, `"n/a"` when undefined
pub(crate) fn fmt_int(x: Option<f64>) -> String {
    match x {
        Some(v) => format!("{}", v.round() as i64),
        None => "n/a".to_string(),
    }
}

/// Signed delta `B − A`, `"n/a"` when either side is undefined
pub(crate) fn fmt_delta(a: Option<f64>, b: Option<f64>, decimals: usize) -> String {
    match (a, b) {
        (Some(a), Some(b)) => format!("{:+.decimals$}", b - a),
        _ => "n/a".to_string(),
    }
}

/// Whether a formatted delta reads as "no change"
///
/// Used by the text renderer to filter unchanged rows; `"n/a"` is a
/// change-unknown state, not "no change".
pub(crate) fn delta_is_zero(delta: &str) -> bool {
    let d = delta.trim();
    if d.is_empty() {
        return true;
    }
    if d == "n/a" {
        return false;
    }
    let d = d.strip_prefix('+').or_else(|| d.strip_prefix('-')).unwrap_or(d);
    d.parse::<f64>().map(|v| v == 0.0).unwrap_or(false)
}

// ============================================================================
// Full diff
// ============================================================================

/// One formatted row of the full diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiff {
    /// Metric label
    #[serde(rename = "metric")]
    pub label: String,
    /// Formatted baseline value
    pub a: String,
    /// Formatted candidate value
    pub b: String,
    /// Formatted signed delta (empty for non-numeric rows)
    pub delta: String,
}

impl FieldDiff {
    fn new(
        label: impl Into<String>,
        a: impl Into<String>,
        b: impl Into<String>,
        delta: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            a: a.into(),
            b: b.into(),
            delta: delta.into(),
        }
    }
}

/// Comparison of two workload summaries
///
/// Owns the two summaries and the ordered rows derived from them;
/// read-only after construction.
#[derive(Debug, Clone)]
pub struct SummaryDiff {
    /// Baseline summary
    pub a: WorkloadSummary,
    /// Candidate summary
    pub b: WorkloadSummary,
    /// Fixed, ordered metric rows
    pub rows: Vec<FieldDiff>,
}

/// Integer-formatted row: rounded values, zero-decimal delta
fn int_row(label: &str, a: Option<f64>, b: Option<f64>) -> FieldDiff {
    FieldDiff::new(label, fmt_int(a), fmt_int(b), fmt_delta(a, b, 0))
}

/// Fixed-decimal row
fn num_row(label: &str, a: Option<f64>, b: Option<f64>, decimals: usize) -> FieldDiff {
    FieldDiff::new(
        label,
        fmt_num(a, decimals),
        fmt_num(b, decimals),
        fmt_delta(a, b, decimals),
    )
}

/// Compare two summaries field by field
///
/// Rows are always present in a fixed order; undefined values render
/// as `"n/a"` rather than being omitted.
pub fn diff_summaries(a: &WorkloadSummary, b: &WorkloadSummary) -> SummaryDiff {
    let rows = vec![
        FieldDiff::new("Tokenizer", &a.tokenizer_used, &b.tokenizer_used, ""),
        FieldDiff::new(
            "Requests",
            a.requests.to_string(),
            b.requests.to_string(),
            fmt_delta(Some(a.requests as f64), Some(b.requests as f64), 0),
        ),
        int_row("Prompt tokens P50", a.prompt_tokens.p50, b.prompt_tokens.p50),
        int_row("Prompt tokens P90", a.prompt_tokens.p90, b.prompt_tokens.p90),
        int_row("Prompt tokens P99", a.prompt_tokens.p99, b.prompt_tokens.p99),
        int_row(
            "Max output cap P90",
            a.max_output_tokens.p90,
            b.max_output_tokens.p90,
        ),
        num_row(
            "Prefill dominance P50",
            a.prefill_dominance.p50,
            b.prefill_dominance.p50,
            3,
        ),
        num_row(
            "Prefill dominance P90",
            a.prefill_dominance.p90,
            b.prefill_dominance.p90,
            3,
        ),
        num_row("Duration (s)", a.arrivals.duration_s, b.arrivals.duration_s, 2),
        num_row("Mean RPS", a.arrivals.mean_rps, b.arrivals.mean_rps, 2),
        int_row(
            "Peak reqs (1s bin)",
            a.arrivals.peak_rps_1s,
            b.arrivals.peak_rps_1s,
        ),
        int_row(
            "Inter-arrival ms P50",
            a.arrivals.interarrival_ms.p50,
            b.arrivals.interarrival_ms.p50,
        ),
        int_row(
            "Inter-arrival ms P90",
            a.arrivals.interarrival_ms.p90,
            b.arrivals.interarrival_ms.p90,
        ),
        num_row(
            "Burstiness (CV)",
            a.arrivals.burstiness_cv,
            b.arrivals.burstiness_cv,
            2,
        ),
        FieldDiff::new(
            "Sessions detected",
            a.sessions.sessions_detected.to_string(),
            b.sessions.sessions_detected.to_string(),
            fmt_delta(
                Some(a.sessions.sessions_detected as f64),
                Some(b.sessions.sessions_detected as f64),
                0,
            ),
        ),
        int_row(
            "Turns/session P90",
            a.sessions.turns_per_session.p90,
            b.sessions.turns_per_session.p90,
        ),
        num_row(
            "Prompt reuse (tokens)",
            a.sessions.prompt_reuse_ratio_tokens,
            b.sessions.prompt_reuse_ratio_tokens,
            3,
        ),
        int_row(
            "Prompt tokens/turn P50",
            a.sessions.prompt_tokens_by_turn.p50,
            b.sessions.prompt_tokens_by_turn.p50,
        ),
        int_row(
            "Prompt tokens/turn P90",
            a.sessions.prompt_tokens_by_turn.p90,
            b.sessions.prompt_tokens_by_turn.p90,
        ),
        int_row(
            "Δtokens/turn P50",
            a.sessions.prompt_token_growth.p50,
            b.sessions.prompt_token_growth.p50,
        ),
        int_row(
            "Δtokens/turn P90",
            a.sessions.prompt_token_growth.p90,
            b.sessions.prompt_token_growth.p90,
        ),
    ];

    SummaryDiff {
        a: a.clone(),
        b: b.clone(),
        rows,
    }
}

/// Structured full-diff output, stable for machine consumption
#[derive(Debug, Clone, Serialize)]
pub struct DiffReport {
    /// Baseline label
    pub a_label: String,
    /// Candidate label
    pub b_label: String,
    /// Primary class of the baseline
    pub primary_class_a: String,
    /// Primary class of the candidate
    pub primary_class_b: String,
    /// Direction hint between the two summaries
    pub shift: String,
    /// All rows, in fixed metric order
    pub metrics: Vec<FieldDiff>,
}

/// Assemble the structured full-diff report
pub fn diff_report(d: &SummaryDiff, a_label: &str, b_label: &str) -> DiffReport {
    DiffReport {
        a_label: a_label.to_string(),
        b_label: b_label.to_string(),
        primary_class_a: primary_class(&d.a).to_string(),
        primary_class_b: primary_class(&d.b).to_string(),
        shift: direction_hint(&d.a, &d.b),
        metrics: d.rows.clone(),
    }
}

// ============================================================================
// Core diff
// ============================================================================

/// Thresholds for the core diff, one per metric
///
/// Passed explicitly into `build_core_diff`, so callers can override
/// policy without touching shared state. `Default` carries the
/// standard gating table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoreThresholds {
    /// Prefill dominance P90: absolute |Δ|
    pub prefill_p90_abs: f64,
    /// Prompt tokens P90: |Δ| / max(|A|, |B|, ε)
    pub prompt_p90_rel: f64,
    /// Burstiness CV: absolute |Δ|
    pub burstiness_abs: f64,
    /// Mean RPS: |Δ| / max(|A|, ε)
    pub mean_rps_rel_a: f64,
    /// Prompt reuse ratio: absolute |Δ|, only when both sides have
    /// sessions
    pub reuse_abs: f64,
}

impl Default for CoreThresholds {
    fn default() -> Self {
        Self {
            prefill_p90_abs: 0.05,
            prompt_p90_rel: 0.10,
            burstiness_abs: 0.50,
            mean_rps_rel_a: 0.10,
            reuse_abs: 0.05,
        }
    }
}

fn abs_delta(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some((b? - a?).abs())
}

fn rel_delta_over_max(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    let (a, b) = (a?, b?);
    let denom = a.abs().max(b.abs()).max(EPS);
    Some((b - a).abs() / denom)
}

fn rel_delta_over_a(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    let (a, b) = (a?, b?);
    let denom = a.abs().max(EPS);
    Some((b - a).abs() / denom)
}

/// Row status in the core diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowStatus {
    /// Deviation within threshold
    #[serde(rename = "OK")]
    Ok,
    /// Deviation exceeded threshold
    #[serde(rename = "FLAG")]
    Flag,
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowStatus::Ok => write!(f, "OK"),
            RowStatus::Flag => write!(f, "FLAG"),
        }
    }
}

/// One row of the core diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreRow {
    /// Metric label
    pub metric: String,
    /// Formatted baseline value
    pub a: String,
    /// Formatted candidate value
    pub b: String,
    /// Formatted signed delta
    pub delta: String,
    /// OK or FLAG
    pub status: RowStatus,
    /// Threshold explanation, for JSON output and debugging
    pub reason: String,
}

/// Result of the thresholded core diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreDiff {
    /// Emitted rows (undefined operands are omitted, never coerced)
    pub rows: Vec<CoreRow>,
    /// Qualitative mismatch flags (e.g. session presence)
    pub structural_flags: Vec<String>,
    /// True if any row flagged or any structural flag fired
    pub any_flag: bool,
}

struct CoreDiffBuilder {
    thresholds: CoreThresholds,
    rows: Vec<CoreRow>,
    structural_flags: Vec<String>,
    any_flag: bool,
}

impl CoreDiffBuilder {
    fn push_row(
        &mut self,
        metric: &str,
        a: Option<f64>,
        b: Option<f64>,
        decimals: usize,
        as_int: bool,
        deviation: f64,
        threshold: f64,
        reason: String,
    ) {
        let (Some(av), Some(bv)) = (a, b) else {
            return;
        };
        let flag = deviation > threshold;
        self.rows.push(CoreRow {
            metric: metric.to_string(),
            a: if as_int { fmt_int(Some(av)) } else { fmt_num(Some(av), decimals) },
            b: if as_int { fmt_int(Some(bv)) } else { fmt_num(Some(bv), decimals) },
            delta: fmt_delta(Some(av), Some(bv), if as_int { 0 } else { decimals }),
            status: if flag { RowStatus::Flag } else { RowStatus::Ok },
            reason,
        });
        self.any_flag |= flag;
    }
}

/// Build the curated, thresholded core diff
///
/// Rules: an undefined operand omits the row entirely; session
/// presence differing between the two sides emits a structural flag
/// instead of a reuse-ratio row; `any_flag` is true if any row
/// exceeded its threshold or any structural flag fired.
pub fn build_core_diff(d: &SummaryDiff, thresholds: &CoreThresholds) -> CoreDiff {
    let a = &d.a;
    let b = &d.b;
    let mut builder = CoreDiffBuilder {
        thresholds: *thresholds,
        rows: Vec::new(),
        structural_flags: Vec::new(),
        any_flag: false,
    };

    // 1) Prefill dominance P90 (absolute delta)
    if let Some(v) = abs_delta(a.prefill_dominance.p90, b.prefill_dominance.p90) {
        let thr = builder.thresholds.prefill_p90_abs;
        builder.push_row(
            "Prefill dominance P90",
            a.prefill_dominance.p90,
            b.prefill_dominance.p90,
            3,
            false,
            v,
            thr,
            format!("|Δ|={v:.3} > {thr:.3}"),
        );
    }

    // 2) Prompt tokens P90 (relative over max)
    if let Some(rel) = rel_delta_over_max(a.prompt_tokens.p90, b.prompt_tokens.p90) {
        let thr = builder.thresholds.prompt_p90_rel;
        builder.push_row(
            "Prompt tokens P90",
            a.prompt_tokens.p90,
            b.prompt_tokens.p90,
            0,
            true,
            rel,
            thr,
            format!("|Δ|/max={rel:.3} > {thr:.3}"),
        );
    }

    // 3) Burstiness CV (absolute delta)
    if let Some(v) = abs_delta(a.arrivals.burstiness_cv, b.arrivals.burstiness_cv) {
        let thr = builder.thresholds.burstiness_abs;
        builder.push_row(
            "Burstiness (CV)",
            a.arrivals.burstiness_cv,
            b.arrivals.burstiness_cv,
            2,
            false,
            v,
            thr,
            format!("|Δ|={v:.3} > {thr:.3}"),
        );
    }

    // 4) Mean RPS (relative over A)
    if let Some(rel) = rel_delta_over_a(a.arrivals.mean_rps, b.arrivals.mean_rps) {
        let thr = builder.thresholds.mean_rps_rel_a;
        builder.push_row(
            "Mean RPS",
            a.arrivals.mean_rps,
            b.arrivals.mean_rps,
            2,
            false,
            rel,
            thr,
            format!("|Δ|/A={rel:.3} > {thr:.3}"),
        );
    }

    // 5) Prompt reuse ratio: only meaningful when both sides have
    //    sessions; a presence mismatch is a structural flag, not a row.
    let a_has = a.sessions.sessions_detected > 0;
    let b_has = b.sessions.sessions_detected > 0;
    if a_has != b_has {
        builder.structural_flags.push(format!(
            "Sessions mismatch: A={}, B={} (FLAG)",
            if a_has { "present" } else { "none" },
            if b_has { "present" } else { "none" },
        ));
        builder.any_flag = true;
    } else if a_has && b_has {
        if let Some(v) = abs_delta(
            a.sessions.prompt_reuse_ratio_tokens,
            b.sessions.prompt_reuse_ratio_tokens,
        ) {
            let thr = builder.thresholds.reuse_abs;
            builder.push_row(
                "Prompt reuse ratio (tokens)",
                a.sessions.prompt_reuse_ratio_tokens,
                b.sessions.prompt_reuse_ratio_tokens,
                3,
                false,
                v,
                thr,
                format!("|Δ|={v:.3} > {thr:.3}"),
            );
        }
    }

    CoreDiff {
        rows: builder.rows,
        structural_flags: builder.structural_flags,
        any_flag: builder.any_flag,
    }
}

/// Structured core-diff output, stable for machine consumption
#[derive(Debug, Clone, Serialize)]
pub struct CoreDiffReport {
    /// Baseline label
    pub a_label: String,
    /// Candidate label
    pub b_label: String,
    /// True if anything flagged
    pub any_flag: bool,
    /// The thresholds the diff was gated against
    pub thresholds: CoreThresholds,
    /// Qualitative mismatch flags
    pub structural_flags: Vec<String>,
    /// Emitted rows with status and reason
    pub metrics: Vec<CoreRow>,
}

/// Assemble the structured core-diff report
pub fn core_diff_report(
    d: &SummaryDiff,
    thresholds: &CoreThresholds,
    a_label: &str,
    b_label: &str,
) -> CoreDiffReport {
    let core = build_core_diff(d, thresholds);
    CoreDiffReport {
        a_label: a_label.to_string(),
        b_label: b_label.to_string(),
        any_flag: core.any_flag,
        thresholds: *thresholds,
        structural_flags: core.structural_flags,
        metrics: core.rows,
    }
}

// ============================================================================
// Regression checks
// ============================================================================

/// Explicit, caller-supplied regression thresholds
///
/// Every field is opt-in: `None` means "don't check this metric".
/// There are no implicit defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegressionThresholds {
    /// Max allowed |Δ| of burstiness CV
    pub burstiness_delta: Option<f64>,
    /// Max allowed |Δ| of prefill dominance P50
    pub prefill_p50_delta: Option<f64>,
    /// Max allowed |Δ| of prompt reuse ratio
    pub reuse_delta: Option<f64>,
    /// Max allowed |Δ| of prompt tokens P50
    pub prompt_p50_delta: Option<f64>,
    /// Max allowed |Δ| of prompt tokens P90
    pub prompt_p90_delta: Option<f64>,
}

impl RegressionThresholds {
    /// Whether any metric is opted in
    pub fn is_empty(&self) -> bool {
        self.burstiness_delta.is_none()
            && self.prefill_p50_delta.is_none()
            && self.reuse_delta.is_none()
            && self.prompt_p50_delta.is_none()
            && self.prompt_p90_delta.is_none()
    }
}

/// Check the diff against the supplied thresholds
///
/// All checks are absolute deltas |B−A|; a metric with an undefined
/// operand on either side is skipped. Returns one human-readable
/// message per exceeded threshold; an empty result means no
/// regression detected.
pub fn check_regressions(d: &SummaryDiff, thresholds: &RegressionThresholds) -> Vec<String> {
    let a = &d.a;
    let b = &d.b;
    let mut msgs: Vec<String> = Vec::new();

    if let Some(thr) = thresholds.burstiness_delta {
        if let Some(v) = abs_delta(a.arrivals.burstiness_cv, b.arrivals.burstiness_cv) {
            if v > thr {
                msgs.push(format!("Burstiness CV changed by {v:.3} (> {thr:.3})"));
            }
        }
    }

    if let Some(thr) = thresholds.prefill_p50_delta {
        if let Some(v) = abs_delta(a.prefill_dominance.p50, b.prefill_dominance.p50) {
            if v > thr {
                msgs.push(format!(
                    "Prefill dominance P50 changed by {v:.3} (> {thr:.3})"
                ));
            }
        }
    }

    if let Some(thr) = thresholds.reuse_delta {
        if let Some(v) = abs_delta(
            a.sessions.prompt_reuse_ratio_tokens,
            b.sessions.prompt_reuse_ratio_tokens,
        ) {
            if v > thr {
                msgs.push(format!(
                    "Prompt reuse (tokens) changed by {v:.3} (> {thr:.3})"
                ));
            }
        }
    }

    if let Some(thr) = thresholds.prompt_p50_delta {
        if let Some(v) = abs_delta(a.prompt_tokens.p50, b.prompt_tokens.p50) {
            if v > thr {
                msgs.push(format!("Prompt tokens P50 changed by {v:.1} (> {thr:.1})"));
            }
        }
    }

    if let Some(thr) = thresholds.prompt_p90_delta {
        if let Some(v) = abs_delta(a.prompt_tokens.p90, b.prompt_tokens.p90) {
            if v > thr {
                msgs.push(format!("Prompt tokens P90 changed by {v:.1} (> {thr:.1})"));
            }
        }
    }

    msgs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrivals::{ArrivalPattern, ArrivalStats};
    use crate::sessions::SessionStats;
    use crate::stats::DistSummary;

    fn dist(p50: f64, p90: f64) -> DistSummary {
        DistSummary {
            n: 10,
            mean: Some((p50 + p90) / 2.0),
            p50: Some(p50),
            p90: Some(p90),
            p99: Some(p90),
            min: Some(p50),
            max: Some(p90),
        }
    }

    fn summary(mean_rps: f64, cv: f64, prompt_p90: f64, prefill_p90: f64) -> WorkloadSummary {
        WorkloadSummary {
            requests: 100,
            tokenizer_used: "whitespace".to_string(),
            prompt_tokens: dist(prompt_p90 / 2.0, prompt_p90),
            max_output_tokens: dist(64.0, 128.0),
            prefill_dominance: dist(prefill_p90 - 0.1, prefill_p90),
            arrivals: ArrivalStats {
                n: 100,
                duration_s: Some(10.0),
                mean_rps: Some(mean_rps),
                peak_rps_1s: Some(mean_rps * 2.0),
                interarrival_ms: dist(80.0, 200.0),
                burstiness_cv: Some(cv),
                pattern: ArrivalPattern::Mixed,
            },
            sessions: SessionStats {
                sessions_detected: 5,
                avg_turns_per_session: Some(4.0),
                turns_per_session: dist(4.0, 6.0),
                prompt_reuse_ratio_tokens: Some(0.6),
                prompt_tokens_by_turn: dist(100.0, 300.0),
                prompt_token_growth: dist(20.0, 50.0),
            },
        }
    }

    fn strip_sessions(mut s: WorkloadSummary) -> WorkloadSummary {
        s.sessions = SessionStats {
            sessions_detected: 0,
            avg_turns_per_session: None,
            turns_per_session: DistSummary::empty(),
            prompt_reuse_ratio_tokens: None,
            prompt_tokens_by_turn: DistSummary::empty(),
            prompt_token_growth: DistSummary::empty(),
        };
        s
    }

    #[test]
    fn test_fmt_helpers() {
        assert_eq!(fmt_num(Some(1.23456), 2), "1.23");
        assert_eq!(fmt_num(None, 2), "n/a");
        assert_eq!(fmt_int(Some(41.6)), "42");
        assert_eq!(fmt_int(None), "n/a");
        assert_eq!(fmt_delta(Some(1.0), Some(3.5), 1), "+2.5");
        assert_eq!(fmt_delta(Some(3.5), Some(1.0), 1), "-2.5");
        assert_eq!(fmt_delta(None, Some(1.0), 1), "n/a");
    }

    #[test]
    fn test_delta_is_zero() {
        assert!(delta_is_zero(""));
        assert!(delta_is_zero("+0"));
        assert!(delta_is_zero("+0.00"));
        assert!(delta_is_zero("-0.000"));
        assert!(!delta_is_zero("n/a"));
        assert!(!delta_is_zero("+0.01"));
    }

    #[test]
    fn test_full_diff_has_fixed_row_order() {
        let a = summary(10.0, 1.0, 400.0, 0.8);
        let b = summary(12.0, 1.2, 500.0, 0.7);
        let d = diff_summaries(&a, &b);

        let labels: Vec<&str> = d.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Tokenizer",
                "Requests",
                "Prompt tokens P50",
                "Prompt tokens P90",
                "Prompt tokens P99",
                "Max output cap P90",
                "Prefill dominance P50",
                "Prefill dominance P90",
                "Duration (s)",
                "Mean RPS",
                "Peak reqs (1s bin)",
                "Inter-arrival ms P50",
                "Inter-arrival ms P90",
                "Burstiness (CV)",
                "Sessions detected",
                "Turns/session P90",
                "Prompt reuse (tokens)",
                "Prompt tokens/turn P50",
                "Prompt tokens/turn P90",
                "Δtokens/turn P50",
                "Δtokens/turn P90",
            ]
        );
    }

    #[test]
    fn test_full_diff_renders_undefined_as_na() {
        let a = strip_sessions(summary(10.0, 1.0, 400.0, 0.8));
        let b = summary(10.0, 1.0, 400.0, 0.8);
        let d = diff_summaries(&a, &b);

        let reuse = d
            .rows
            .iter()
            .find(|r| r.label == "Prompt reuse (tokens)")
            .unwrap();
        assert_eq!(reuse.a, "n/a");
        assert_eq!(reuse.b, "0.600");
        assert_eq!(reuse.delta, "n/a");
    }

    #[test]
    fn test_full_diff_signed_delta() {
        let a = summary(10.0, 1.0, 400.0, 0.8);
        let b = summary(8.0, 1.0, 400.0, 0.8);
        let d = diff_summaries(&a, &b);
        let rps = d.rows.iter().find(|r| r.label == "Mean RPS").unwrap();
        assert_eq!(rps.delta, "-2.00");
    }

    #[test]
    fn test_core_diff_all_ok() {
        let a = summary(10.0, 1.0, 400.0, 0.8);
        let b = summary(10.0, 1.0, 400.0, 0.8);
        let d = diff_summaries(&a, &b);
        let core = build_core_diff(&d, &CoreThresholds::default());

        assert!(!core.any_flag);
        assert!(core.structural_flags.is_empty());
        assert_eq!(core.rows.len(), 5);
        assert!(core.rows.iter().all(|r| r.status == RowStatus::Ok));
    }

    #[test]
    fn test_mean_rps_threshold_edge() {
        // A=10, B=11: relative delta exactly 0.10, not greater -> OK
        let a = summary(10.0, 1.0, 400.0, 0.8);
        let b = summary(11.0, 1.0, 400.0, 0.8);
        let d = diff_summaries(&a, &b);
        let core = build_core_diff(&d, &CoreThresholds::default());
        let rps = core.rows.iter().find(|r| r.metric == "Mean RPS").unwrap();
        assert_eq!(rps.status, RowStatus::Ok);

        // A=10, B=11.5: relative delta 0.15 > 0.10 -> FLAG
        let b = summary(11.5, 1.0, 400.0, 0.8);
        let d = diff_summaries(&a, &b);
        let core = build_core_diff(&d, &CoreThresholds::default());
        let rps = core.rows.iter().find(|r| r.metric == "Mean RPS").unwrap();
        assert_eq!(rps.status, RowStatus::Flag);
        assert!(core.any_flag);
    }

    #[test]
    fn test_prompt_tokens_relative_over_max() {
        // A=400, B=500: |Δ|/max = 100/500 = 0.2 > 0.1 -> FLAG
        let a = summary(10.0, 1.0, 400.0, 0.8);
        let b = summary(10.0, 1.0, 500.0, 0.8);
        let d = diff_summaries(&a, &b);
        let core = build_core_diff(&d, &CoreThresholds::default());
        let row = core
            .rows
            .iter()
            .find(|r| r.metric == "Prompt tokens P90")
            .unwrap();
        assert_eq!(row.status, RowStatus::Flag);
        // integer formatting for token counts
        assert_eq!(row.a, "400");
        assert_eq!(row.b, "500");
        assert_eq!(row.delta, "+100");
    }

    #[test]
    fn test_structural_flag_on_session_mismatch() {
        let a = strip_sessions(summary(10.0, 1.0, 400.0, 0.8));
        let b = summary(10.0, 1.0, 400.0, 0.8);
        let d = diff_summaries(&a, &b);
        let core = build_core_diff(&d, &CoreThresholds::default());

        assert!(core.any_flag);
        assert_eq!(core.structural_flags.len(), 1);
        assert!(core.structural_flags[0].contains("A=none"));
        assert!(core.structural_flags[0].contains("B=present"));
        // reuse-ratio row is omitted, not emitted with a placeholder
        assert!(core.rows.iter().all(|r| r.metric != "Prompt reuse ratio (tokens)"));
    }

    #[test]
    fn test_no_sessions_on_both_sides_is_not_structural() {
        let a = strip_sessions(summary(10.0, 1.0, 400.0, 0.8));
        let b = strip_sessions(summary(10.0, 1.0, 400.0, 0.8));
        let d = diff_summaries(&a, &b);
        let core = build_core_diff(&d, &CoreThresholds::default());
        assert!(!core.any_flag);
        assert!(core.structural_flags.is_empty());
        assert_eq!(core.rows.len(), 4); // no reuse row
    }

    #[test]
    fn test_undefined_operand_omits_core_row() {
        let mut a = summary(10.0, 1.0, 400.0, 0.8);
        a.arrivals.burstiness_cv = None;
        let b = summary(10.0, 1.0, 400.0, 0.8);
        let d = diff_summaries(&a, &b);
        let core = build_core_diff(&d, &CoreThresholds::default());
        assert!(core.rows.iter().all(|r| r.metric != "Burstiness (CV)"));
    }

    #[test]
    fn test_custom_thresholds_override_policy() {
        let a = summary(10.0, 1.0, 400.0, 0.8);
        let b = summary(10.5, 1.0, 400.0, 0.8); // 5% RPS shift
        let d = diff_summaries(&a, &b);

        let strict = CoreThresholds {
            mean_rps_rel_a: 0.01,
            ..CoreThresholds::default()
        };
        let core = build_core_diff(&d, &strict);
        let rps = core.rows.iter().find(|r| r.metric == "Mean RPS").unwrap();
        assert_eq!(rps.status, RowStatus::Flag);
    }

    #[test]
    fn test_diff_report_is_deterministic() {
        let a = summary(10.0, 2.0, 400.0, 0.8);
        let b = strip_sessions(summary(14.0, 0.5, 600.0, 0.6));

        let first = serde_json::to_string(&diff_report(&diff_summaries(&a, &b), "a", "b")).unwrap();
        let second = serde_json::to_string(&diff_report(&diff_summaries(&a, &b), "a", "b")).unwrap();
        assert_eq!(first, second);

        let core_first = serde_json::to_string(&core_diff_report(
            &diff_summaries(&a, &b),
            &CoreThresholds::default(),
            "a",
            "b",
        ))
        .unwrap();
        let core_second = serde_json::to_string(&core_diff_report(
            &diff_summaries(&a, &b),
            &CoreThresholds::default(),
            "a",
            "b",
        ))
        .unwrap();
        assert_eq!(core_first, core_second);
    }

    #[test]
    fn test_regression_checks_opt_in() {
        let a = summary(10.0, 1.0, 400.0, 0.8);
        let b = summary(10.0, 3.0, 800.0, 0.8);
        let d = diff_summaries(&a, &b);

        // nothing requested, nothing reported
        let msgs = check_regressions(&d, &RegressionThresholds::default());
        assert!(msgs.is_empty());

        // only burstiness requested; the large prompt shift is ignored
        let thresholds = RegressionThresholds {
            burstiness_delta: Some(0.5),
            ..Default::default()
        };
        let msgs = check_regressions(&d, &thresholds);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].starts_with("Burstiness CV changed by"));
    }

    #[test]
    fn test_regression_checks_skip_undefined() {
        let mut a = summary(10.0, 1.0, 400.0, 0.8);
        a.arrivals.burstiness_cv = None;
        let b = summary(10.0, 3.0, 400.0, 0.8);
        let d = diff_summaries(&a, &b);

        let thresholds = RegressionThresholds {
            burstiness_delta: Some(0.1),
            ..Default::default()
        };
        assert!(check_regressions(&d, &thresholds).is_empty());
    }

    #[test]
    fn test_regression_within_threshold_is_silent() {
        let a = summary(10.0, 1.0, 400.0, 0.8);
        let b = summary(10.0, 1.2, 400.0, 0.8);
        let d = diff_summaries(&a, &b);
        let thresholds = RegressionThresholds {
            burstiness_delta: Some(0.5),
            ..Default::default()
        };
        assert!(check_regressions(&d, &thresholds).is_empty());
    }
}
