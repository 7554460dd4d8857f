//! Multi-turn session analysis
//!
//! Groups requests by session id and walks turns in arrival order to
//! estimate prompt-prefix reuse and per-turn prompt growth.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::request::Request;
use crate::stats::{mean, DistSummary};
use crate::tokenizer::Tokenize;

/// Multi-turn statistics over the sessions present in a trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Number of distinct session ids
    pub sessions_detected: usize,
    /// Mean turn count per session
    pub avg_turns_per_session: Option<f64>,
    /// Distribution of turn counts across sessions
    pub turns_per_session: DistSummary,
    /// Mean over consecutive turns of LCP(prev, cur) / len(cur);
    /// in [0, 1] when defined
    pub prompt_reuse_ratio_tokens: Option<f64>,
    /// Distribution of per-turn prompt token counts
    pub prompt_tokens_by_turn: DistSummary,
    /// Distribution of turn-over-turn token-count deltas (may be
    /// negative)
    pub prompt_token_growth: DistSummary,
}

impl SessionStats {
    fn empty() -> Self {
        Self {
            sessions_detected: 0,
            avg_turns_per_session: None,
            turns_per_session: DistSummary::empty(),
            prompt_reuse_ratio_tokens: None,
            prompt_tokens_by_turn: DistSummary::empty(),
            prompt_token_growth: DistSummary::empty(),
        }
    }
}

/// Elementwise longest common prefix of two token-id sequences
fn common_prefix_len(a: &[u32], b: &[u32]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Analyze the multi-turn sessions in a trace
///
/// Requests without a session id are excluded, not an error. Groups
/// are visited in first-seen order and turns within a group are
/// stably sorted by `arrival_time_ms`, so requests sharing a
/// timestamp keep their original trace order and repeated runs
/// accumulate in the same order.
pub fn analyze_sessions(reqs: &[Request], tokenizer: &dyn Tokenize) -> SessionStats {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<&Request>> = Vec::new();
    for r in reqs {
        let Some(sid) = r.session_id.as_deref() else {
            continue;
        };
        match index.get(sid) {
            Some(&i) => groups[i].push(r),
            None => {
                index.insert(sid, groups.len());
                groups.push(vec![r]);
            }
        }
    }

    if groups.is_empty() {
        return SessionStats::empty();
    }

    let mut turns: Vec<f64> = Vec::new();
    let mut reuse_samples: Vec<f64> = Vec::new();
    let mut prompt_lens: Vec<f64> = Vec::new();
    let mut growth: Vec<f64> = Vec::new();

    for group in &mut groups {
        group.sort_by_key(|r| r.arrival_time_ms);
        turns.push(group.len() as f64);

        let mut prev_tokens: Option<Vec<u32>> = None;
        for r in group.iter() {
            let cur_tokens = tokenizer.encode(&r.prompt);
            let cur_len = cur_tokens.len();
            prompt_lens.push(cur_len as f64);

            if let Some(prev) = &prev_tokens {
                if cur_len > 0 {
                    let cpl = common_prefix_len(prev, &cur_tokens);
                    reuse_samples.push(cpl as f64 / cur_len as f64);
                }
                growth.push(cur_len as f64 - prev.len() as f64);
            }

            prev_tokens = Some(cur_tokens);
        }
    }

    let turns_summary = DistSummary::from_sample(&turns);

    SessionStats {
        sessions_detected: groups.len(),
        avg_turns_per_session: turns_summary.mean,
        turns_per_session: turns_summary,
        prompt_reuse_ratio_tokens: mean(&reuse_samples),
        prompt_tokens_by_turn: DistSummary::from_sample(&prompt_lens),
        prompt_token_growth: DistSummary::from_sample(&growth),
    }
}
