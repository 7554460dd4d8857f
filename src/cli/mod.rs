//! CLI argument parsing and command dispatch

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use loadshape_core::{
    build_core_diff, build_summary, check_regressions, core_diff_report, diff_report,
    diff_summaries, read_requests, render_core_diff, render_diff, render_summary,
    CoreThresholds, RegressionThresholds, Tokenize, TokenizerChoice, WorkloadSummary,
};

#[derive(Parser)]
#[command(name = "loadshape")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a workload JSONL trace
    Analyze {
        /// Path to the workload JSONL trace
        trace: PathBuf,

        #[command(flatten)]
        tokenizer: TokenizerArgs,

        /// Emit the summary as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Compare two workload JSONL traces (A = baseline, B = candidate)
    Diff {
        /// Path to trace A (baseline)
        a: PathBuf,

        /// Path to trace B (candidate)
        b: PathBuf,

        #[command(flatten)]
        tokenizer: TokenizerArgs,

        /// Emit structured JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Thresholded core diff only; exits nonzero on any flag
        #[arg(long)]
        core: bool,

        /// Hide rows whose delta is zero (full diff only)
        #[arg(long)]
        only_changed: bool,

        #[command(flatten)]
        checks: CheckArgs,
    },
}

#[derive(Args)]
pub struct TokenizerArgs {
    /// HuggingFace tokenizer.json to tokenize prompts with; falls
    /// back to whitespace token slots when absent or unloadable
    #[arg(long, value_name = "PATH")]
    pub tokenizer_file: Option<PathBuf>,
}

/// Opt-in regression thresholds; omitted metrics are not checked
#[derive(Args)]
pub struct CheckArgs {
    /// Max allowed |Δ| of burstiness CV
    #[arg(long, value_name = "DELTA")]
    pub check_burstiness: Option<f64>,

    /// Max allowed |Δ| of prefill dominance P50
    #[arg(long, value_name = "DELTA")]
    pub check_prefill_p50: Option<f64>,

    /// Max allowed |Δ| of prompt reuse ratio
    #[arg(long, value_name = "DELTA")]
    pub check_reuse: Option<f64>,

    /// Max allowed |Δ| of prompt tokens P50
    #[arg(long, value_name = "DELTA")]
    pub check_prompt_p50: Option<f64>,

    /// Max allowed |Δ| of prompt tokens P90
    #[arg(long, value_name = "DELTA")]
    pub check_prompt_p90: Option<f64>,
}

impl CheckArgs {
    fn to_thresholds(&self) -> RegressionThresholds {
        RegressionThresholds {
            burstiness_delta: self.check_burstiness,
            prefill_p50_delta: self.check_prefill_p50,
            reuse_delta: self.check_reuse,
            prompt_p50_delta: self.check_prompt_p50,
            prompt_p90_delta: self.check_prompt_p90,
        }
    }
}

fn build_tokenizer(args: &TokenizerArgs) -> Box<dyn Tokenize> {
    let Some(path) = &args.tokenizer_file else {
        return Box::new(loadshape_core::WhitespaceTokenizer);
    };
    match TokenizerChoice::HfFile(path.clone()).build() {
        Ok(tok) => tok,
        Err(e) => {
            tracing::warn!("{e}; falling back to whitespace tokenizer");
            Box::new(loadshape_core::WhitespaceTokenizer)
        }
    }
}

fn summarize(path: &Path, tokenizer: &dyn Tokenize) -> Result<WorkloadSummary> {
    let reqs = read_requests(path)?;
    tracing::debug!("read {} requests from {}", reqs.len(), path.display());
    Ok(build_summary(&reqs, tokenizer))
}

/// Execute the parsed command; returns the process exit code
pub fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Analyze {
            trace,
            tokenizer,
            json,
        } => {
            let tok = build_tokenizer(&tokenizer);
            let summary = summarize(&trace, tok.as_ref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", render_summary(&summary, &trace.display().to_string()));
            }
            Ok(0)
        }

        Commands::Diff {
            a,
            b,
            tokenizer,
            json,
            core,
            only_changed,
            checks,
        } => {
            let tok = build_tokenizer(&tokenizer);
            let a_sum = summarize(&a, tok.as_ref())?;
            let b_sum = summarize(&b, tok.as_ref())?;
            let a_label = a.display().to_string();
            let b_label = b.display().to_string();

            let d = diff_summaries(&a_sum, &b_sum);

            if core {
                let thresholds = CoreThresholds::default();
                let result = build_core_diff(&d, &thresholds);
                if json {
                    let report = core_diff_report(&d, &thresholds, &a_label, &b_label);
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    println!("{}", render_core_diff(&result, &a_label, &b_label));
                }
                return Ok(if result.any_flag { 1 } else { 0 });
            }

            if json {
                let report = diff_report(&d, &a_label, &b_label);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", render_diff(&d, &a_label, &b_label, only_changed));
            }

            let thresholds = checks.to_thresholds();
            if !thresholds.is_empty() {
                let regressions = check_regressions(&d, &thresholds);
                for msg in &regressions {
                    eprintln!("REGRESSION: {msg}");
                }
                if !regressions.is_empty() {
                    return Ok(1);
                }
            }
            Ok(0)
        }
    }
}
