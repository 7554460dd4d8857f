//! loadshape-core: workload trace characterization and comparison
//!
//! This crate analyzes ordered sequences of request records (arrival
//! offset, prompt, output-token cap, optional session id) and
//! produces:
//!
//! - **Summaries**: distributional statistics describing a trace's
//!   load shape — arrival burstiness, prompt-size distribution,
//!   multi-turn session reuse
//! - **Diffs**: a full field-by-field comparison of two summaries,
//!   plus a thresholded "core" diff that flags regressions for
//!   automated gating
//!
//! Every operation is a pure function from immutable inputs to
//! immutable outputs. Undefined statistics (empty or insufficient
//! samples) are explicit `None` values that propagate; degenerate
//! inputs (empty trace, no sessions, identical timestamps) never
//! fail.
//!
//! # Example
//!
//! ```
//! use loadshape_core::{build_summary, diff_summaries, Request, WhitespaceTokenizer};
//! use loadshape_core::{build_core_diff, CoreThresholds};
//!
//! let reqs = vec![Request {
//!     request_id: "r1".to_string(),
//!     prompt: "hello world".to_string(),
//!     max_output_tokens: 64,
//!     arrival_time_ms: 0,
//!     session_id: None,
//! }];
//!
//! let summary = build_summary(&reqs, &WhitespaceTokenizer);
//! let diff = diff_summaries(&summary, &summary);
//! let core = build_core_diff(&diff, &CoreThresholds::default());
//! assert!(!core.any_flag);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arrivals;
pub mod classify;
pub mod diff;
pub mod error;
pub mod render;
pub mod request;
pub mod sessions;
pub mod stats;
pub mod summary;
pub mod tokenizer;

pub use arrivals::{analyze_arrivals, ArrivalPattern, ArrivalStats};
pub use classify::{direction_hint, primary_class, WorkloadClass};
pub use diff::{
    build_core_diff, check_regressions, core_diff_report, diff_report, diff_summaries, CoreDiff,
    CoreDiffReport, CoreRow, CoreThresholds, DiffReport, FieldDiff, RegressionThresholds,
    RowStatus, SummaryDiff,
};
pub use error::{Error, Result};
pub use render::{render_core_diff, render_diff, render_summary};
pub use request::{read_requests, Request};
pub use sessions::{analyze_sessions, SessionStats};
pub use stats::DistSummary;
pub use summary::{build_summary, WorkloadSummary};
pub use tokenizer::{HfTokenizer, Tokenize, TokenizerChoice, WhitespaceTokenizer};
