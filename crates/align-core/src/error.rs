//! Error taxonomy for scoring configuration and alignment failures.

use thiserror::Error;

/// Raised when a [`crate::scoring::ScoringScheme`] is inconsistent with the
/// operation being requested of it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("scoring scheme uses a substitution matrix; no scalar match/mismatch score is available")]
    NoScalarMatchScore,
    #[error("scoring scheme uses scalar match/mismatch scores; no substitution matrix is installed")]
    NoMatrix,
    #[error("substitution matrix is not symmetric at letters ({0}, {1})")]
    AsymmetricMatrix(u8, u8),
    #[error("Waterman-Smith-Beyer selected but no gap cost function was supplied for the {0:?} side")]
    MissingGapFn(Side),
}

/// Which sequence's gap-cost family a parameter or function applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Target,
    Query,
}

/// Failure modes for `score`/`align` operations.
#[derive(Debug, Error)]
pub enum AlignError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to allocate a {rows}x{cols} dynamic programming matrix")]
    Allocation { rows: usize, cols: usize },

    #[error("gap cost callback failed: {0}")]
    Callback(String),

    #[error("empty input sequence")]
    EmptyInput,

    #[error("byte {0:#04x} at position {1} is not an ASCII letter")]
    InvalidLetter(u8, usize),
}

/// Result of [`crate::path::PathGenerator::len`]: either the exact number of
/// co-optimal paths, or a sentinel indicating the count overflowed a
/// native `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCount {
    Count(u64),
    Overflow,
}

impl PathCount {
    pub fn is_overflow(self) -> bool {
        matches!(self, PathCount::Overflow)
    }
}
