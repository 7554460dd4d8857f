//! Workload classification heuristics
//!
//! Literal ordered rule lists evaluated top-down; the rule order is
//! part of the observable contract.

use serde::{Deserialize, Serialize};

use crate::summary::WorkloadSummary;

/// Primary workload class for one summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkloadClass {
    /// Session-driven with high prompt reuse and prefill-heavy
    /// requests
    InteractiveChatPrefillHeavy,
    /// Session-driven with high prompt reuse
    InteractiveChat,
    /// Highly bursty arrivals without session reuse
    BurstyApi,
    /// Everything else
    BatchOffline,
}

impl std::fmt::Display for WorkloadClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkloadClass::InteractiveChatPrefillHeavy => {
                write!(f, "interactive-chat (prefill-heavy)")
            }
            WorkloadClass::InteractiveChat => write!(f, "interactive-chat"),
            WorkloadClass::BurstyApi => write!(f, "bursty-api"),
            WorkloadClass::BatchOffline => write!(f, "batch/offline"),
        }
    }
}

/// Classify a single summary; first matching rule wins
pub fn primary_class(s: &WorkloadSummary) -> WorkloadClass {
    if s.sessions.sessions_detected > 0 {
        if let Some(reuse) = s.sessions.prompt_reuse_ratio_tokens {
            if reuse > 0.5 {
                if let Some(p50) = s.prefill_dominance.p50 {
                    if p50 > 0.65 {
                        return WorkloadClass::InteractiveChatPrefillHeavy;
                    }
                }
                return WorkloadClass::InteractiveChat;
            }
        }
    }
    if let Some(cv) = s.arrivals.burstiness_cv {
        if cv > 1.5 {
            return WorkloadClass::BurstyApi;
        }
    }
    WorkloadClass::BatchOffline
}

/// Describe how B shifted relative to A
///
/// The three tests are independent; every triggered hint is joined
/// with commas. Undefined operands suppress a test rather than
/// triggering it.
pub fn direction_hint(a: &WorkloadSummary, b: &WorkloadSummary) -> String {
    let mut hints: Vec<&str> = Vec::new();

    if let (Some(acv), Some(bcv)) = (a.arrivals.burstiness_cv, b.arrivals.burstiness_cv) {
        if bcv - acv > 0.5 {
            hints.push("more bursty");
        } else if acv - bcv > 0.5 {
            hints.push("less bursty");
        }
    }

    if let (Some(ap), Some(bp)) = (a.prefill_dominance.p50, b.prefill_dominance.p50) {
        if bp - ap > 0.05 {
            hints.push("more prefill-heavy");
        } else if ap - bp > 0.05 {
            hints.push("less prefill-heavy");
        }
    }

    if let (Some(ar), Some(br)) = (
        a.sessions.prompt_reuse_ratio_tokens,
        b.sessions.prompt_reuse_ratio_tokens,
    ) {
        if br - ar > 0.05 {
            hints.push("higher reuse");
        } else if ar - br > 0.05 {
            hints.push("lower reuse");
        }
    }

    if hints.is_empty() {
        "no major shift detected".to_string()
    } else {
        hints.join(", ")
    }
}
