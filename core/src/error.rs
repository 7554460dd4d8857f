//! Error types for loadshape-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed trace line (the reader aborts on the first bad line)
    #[error("{path}:{line}: {message}")]
    Parse {
        /// Source file path
        path: String,
        /// 1-based line number
        line: usize,
        /// Decoder message
        message: String,
    },

    /// Tokenizer could not be loaded or configured
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
