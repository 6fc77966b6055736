//! Error types for instance loading, CLI validation and solution checking.

/// Errors produced outside the core search loop: instance parsing, initial
/// permutation validation, and solution-file checking.
#[derive(Debug, thiserror::Error)]
pub enum QapError {
    #[error("parse error in {file}: {reason}")]
    Parse { file: String, reason: String },

    #[error("not a valid permutation of size {size}: value {value} at position {index}")]
    InvalidPermutation {
        size: usize,
        index: usize,
        value: i64,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
