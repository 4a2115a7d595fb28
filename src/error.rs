//! Fatal run conditions

use thiserror::Error;

/// Result type of the interpreter core
pub type Result<T> = std::result::Result<T, Error>;

/// Conditions that abort a run. None of them are recovered by the interpreter.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid allocation of {size} cells")]
    InvalidAllocation { size: usize },

    /// `line` is 1-based.
    #[error("syntax error on line {line}: {text}")]
    Syntax { line: usize, text: String },

    #[error("failed to read input: {0}")]
    Input(#[from] std::io::Error),
}
