//! Workload summary assembly
//!
//! Pure orchestration: prompt and output-cap distributions from the
//! request list, arrival and session analysis, one immutable
//! `WorkloadSummary` per trace.

use serde::{Deserialize, Serialize};

use crate::arrivals::{analyze_arrivals, ArrivalStats};
use crate::request::Request;
use crate::sessions::{analyze_sessions, SessionStats};
use crate::stats::DistSummary;
use crate::tokenizer::Tokenize;

/// Distributional characterization of one trace
///
/// Built once per trace; immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadSummary {
    /// Number of requests in the trace
    pub requests: usize,
    /// Label of the tokenizer used for token statistics
    pub tokenizer_used: String,
    /// Prompt token counts
    pub prompt_tokens: DistSummary,
    /// Output-token caps
    pub max_output_tokens: DistSummary,
    /// Prompt-token share of each request's total token budget
    /// (prompt + max output); requests with a zero budget contribute
    /// no sample
    pub prefill_dominance: DistSummary,
    /// Arrival-pattern statistics
    pub arrivals: ArrivalStats,
    /// Multi-turn session statistics
    pub sessions: SessionStats,
}

/// Build the summary of one trace
pub fn build_summary(reqs: &[Request], tokenizer: &dyn Tokenize) -> WorkloadSummary {
    let mut prompt_lens: Vec<f64> = Vec::with_capacity(reqs.len());
    let mut output_caps: Vec<f64> = Vec::with_capacity(reqs.len());
    let mut prefill: Vec<f64> = Vec::with_capacity(reqs.len());

    for r in reqs {
        let prompt_tokens = tokenizer.encode(&r.prompt).len() as f64;
        prompt_lens.push(prompt_tokens);
        output_caps.push(r.max_output_tokens as f64);

        let budget = prompt_tokens + r.max_output_tokens as f64;
        if budget > 0.0 {
            prefill.push(prompt_tokens / budget);
        }
    }

    let arrival_ms: Vec<i64> = reqs.iter().map(|r| r.arrival_time_ms).collect();

    WorkloadSummary {
        requests: reqs.len(),
        tokenizer_used: tokenizer.label().to_string(),
        prompt_tokens: DistSummary::from_sample(&prompt_lens),
        max_output_tokens: DistSummary::from_sample(&output_caps),
        prefill_dominance: DistSummary::from_sample(&prefill),
        arrivals: analyze_arrivals(&arrival_ms),
        sessions: analyze_sessions(reqs, tokenizer),
    }
}
