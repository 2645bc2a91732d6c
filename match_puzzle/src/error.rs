use thiserror::Error;

/// Errors raised while setting up a puzzle.
///
/// Nothing that happens during play is an error: rejected placements and
/// detachments report `false` instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    /// The symbol pool cannot supply a key of the requested length.
    #[error("symbol pool has {available} distinct symbols, key needs {needed}")]
    InsufficientSymbols { needed: usize, available: usize },

    /// A configuration value is out of range.
    #[error("invalid puzzle configuration: {0}")]
    InvalidConfig(String),
}
