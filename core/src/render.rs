//! Fixed-width text rendering
//!
//! A thin layer over the structured shapes: same values, same
//! ordering. Not part of the stable machine contract.

use crate::classify::{direction_hint, primary_class};
use crate::diff::{delta_is_zero, fmt_int, fmt_num, CoreDiff, SummaryDiff};
use crate::summary::WorkloadSummary;

/// Render a single-trace summary
pub fn render_summary(s: &WorkloadSummary, label: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("WORKLOAD SUMMARY".to_string());
    lines.push("----------------".to_string());
    lines.push(format!("Trace         : {label}"));
    lines.push(format!("Requests      : {}", s.requests));
    lines.push(format!("Tokenizer     : {}", s.tokenizer_used));
    lines.push(format!("Primary class : {}", primary_class(s)));
    lines.push(String::new());

    lines.push(format!(
        "Prompt tokens     : p50={} p90={} p99={} max={}",
        fmt_int(s.prompt_tokens.p50),
        fmt_int(s.prompt_tokens.p90),
        fmt_int(s.prompt_tokens.p99),
        fmt_int(s.prompt_tokens.max),
    ));
    lines.push(format!(
        "Max output cap    : p50={} p90={}",
        fmt_int(s.max_output_tokens.p50),
        fmt_int(s.max_output_tokens.p90),
    ));
    lines.push(format!(
        "Prefill dominance : p50={} p90={}",
        fmt_num(s.prefill_dominance.p50, 3),
        fmt_num(s.prefill_dominance.p90, 3),
    ));
    lines.push(String::new());

    lines.push(format!(
        "Arrivals          : duration={}s mean_rps={} peak_1s={}",
        fmt_num(s.arrivals.duration_s, 2),
        fmt_num(s.arrivals.mean_rps, 2),
        fmt_int(s.arrivals.peak_rps_1s),
    ));
    lines.push(format!(
        "Inter-arrival ms  : p50={} p90={} cv={}",
        fmt_int(s.arrivals.interarrival_ms.p50),
        fmt_int(s.arrivals.interarrival_ms.p90),
        fmt_num(s.arrivals.burstiness_cv, 2),
    ));
    lines.push(format!("Arrival pattern   : {}", s.arrivals.pattern));
    lines.push(String::new());

    lines.push(format!(
        "Sessions          : {} detected, avg turns={}",
        s.sessions.sessions_detected,
        fmt_num(s.sessions.avg_turns_per_session, 2),
    ));
    lines.push(format!(
        "Prompt reuse      : {}",
        fmt_num(s.sessions.prompt_reuse_ratio_tokens, 3),
    ));
    lines.push(format!(
        "Tokens/turn       : p50={} p90={}  growth p50={}",
        fmt_int(s.sessions.prompt_tokens_by_turn.p50),
        fmt_int(s.sessions.prompt_tokens_by_turn.p90),
        fmt_int(s.sessions.prompt_token_growth.p50),
    ));

    lines.join("\n")
}

/// Render the full diff as a fixed-width table
pub fn render_diff(d: &SummaryDiff, a_label: &str, b_label: &str, only_changed: bool) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("WORKLOAD DIFF".to_string());
    lines.push("-------------".to_string());
    lines.push(format!("A (baseline) : {a_label}"));
    lines.push(format!("B (candidate): {b_label}"));
    lines.push(String::new());
    lines.push(format!("Primary class A : {}", primary_class(&d.a)));
    lines.push(format!("Primary class B : {}", primary_class(&d.b)));
    lines.push(format!("Shift           : {}", direction_hint(&d.a, &d.b)));
    lines.push(String::new());

    let rows: Vec<_> = d
        .rows
        .iter()
        .filter(|r| !only_changed || !delta_is_zero(&r.delta))
        .collect();

    let col1 = rows.iter().map(|r| r.label.len()).max().unwrap_or(10);
    let col2 = rows.iter().map(|r| r.a.len()).max().unwrap_or(10);
    let col3 = rows.iter().map(|r| r.b.len()).max().unwrap_or(10);

    let header = format!(
        "{:col1$}  {:col2$}  {:col3$}  Δ(B-A)",
        "Metric", "A", "B"
    );
    lines.push(header.clone());
    lines.push("-".repeat(header.len()));

    for r in rows {
        lines.push(format!(
            "{:col1$}  {:col2$}  {:col3$}  {}",
            r.label, r.a, r.b, r.delta
        ));
    }

    lines.join("\n")
}

/// Render the core diff as a fixed-width table
pub fn render_core_diff(core: &CoreDiff, a_label: &str, b_label: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("CORE DIFF".to_string());
    lines.push("---------".to_string());
    lines.push(format!("A (baseline) : {a_label}"));
    lines.push(format!("B (candidate): {b_label}"));
    lines.push(String::new());

    for flag in &core.structural_flags {
        lines.push(flag.clone());
    }
    if !core.structural_flags.is_empty() {
        lines.push(String::new());
    }

    if core.rows.is_empty() {
        lines.push("(no core metrics applicable)".to_string());
        return lines.join("\n");
    }

    let col1 = core.rows.iter().map(|r| r.metric.len()).max().unwrap_or(10);
    let col2 = core.rows.iter().map(|r| r.a.len()).max().unwrap_or(10);
    let col3 = core.rows.iter().map(|r| r.b.len()).max().unwrap_or(10);

    let header = format!(
        "{:col1$}  {:col2$}  {:col3$}  Δ(B-A)   Status",
        "Metric", "A", "B"
    );
    lines.push(header.clone());
    lines.push("-".repeat(header.len()));

    for r in &core.rows {
        lines.push(format!(
            "{:col1$}  {:col2$}  {:col3$}  {:7}  {}",
            r.metric, r.a, r.b, r.delta, r.status
        ));
    }

    lines.join("\n")
}
