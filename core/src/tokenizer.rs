//! Tokenizer capability
//!
//! The engine is agnostic to the underlying vocabulary: it only needs
//! a deterministic, side-effect-free `encode`. Callers inject either
//! a real vocabulary-based implementation or the whitespace fallback,
//! selected by configuration.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Single-method tokenizer capability
///
/// `encode` must be pure: the same text always yields the same
/// ordered token-id sequence. The label is recorded in summaries for
/// traceability in diffs and reports.
pub trait Tokenize {
    /// Map text to an ordered sequence of integer token ids
    fn encode(&self, text: &str) -> Vec<u32>;

    /// Short identifier recorded in summaries (e.g. "whitespace")
    fn label(&self) -> &str;
}

/// Always-available fallback tokenizer
///
/// Treats whitespace-delimited chunks as opaque token slots. Not
/// accurate, but keeps relative statistics meaningful when no real
/// tokenizer is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenize for WhitespaceTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        (0..text.split_whitespace().count() as u32).collect()
    }

    fn label(&self) -> &str {
        "whitespace"
    }
}

/// HuggingFace `tokenizer.json` backed implementation
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
    label: String,
}

impl HfTokenizer {
    /// Load a tokenizer from a `tokenizer.json` file
    pub fn from_file(path: &Path) -> Result<Self> {
        let inner = tokenizers::Tokenizer::from_file(path)
            .map_err(|e| Error::Tokenizer(format!("{}: {e}", path.display())))?;
        let label = format!("hf:{}", path.display());
        Ok(Self { inner, label })
    }
}

impl Tokenize for HfTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        // Encoding valid UTF-8 without special tokens does not fail in
        // practice; an empty sequence keeps the statistics degenerate
        // rather than aborting a pure analysis pass.
        self.inner
            .encode(text, false)
            .map(|enc| enc.get_ids().to_vec())
            .unwrap_or_default()
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Tokenizer selection, resolved from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizerChoice {
    /// The whitespace fallback
    Whitespace,
    /// A HuggingFace `tokenizer.json` file
    HfFile(PathBuf),
}

impl TokenizerChoice {
    /// Build the selected tokenizer
    ///
    /// Loading failure is surfaced to the caller; the library never
    /// falls back silently.
    pub fn build(&self) -> Result<Box<dyn Tokenize>> {
        match self {
            TokenizerChoice::Whitespace => Ok(Box::new(WhitespaceTokenizer)),
            TokenizerChoice::HfFile(path) => Ok(Box::new(HfTokenizer::from_file(path)?)),
        }
    }
}
