//! Error types for the selection module

use thiserror::Error;

/// Error surfaced by a history collaborator.
pub type HistoryError = Box<dyn std::error::Error + Send + Sync>;

/// Reasons a selection cycle can end without updating the stored pair.
///
/// None of these are fatal to the host process: the engine keeps its
/// previous selection and the next universe change starts a fresh cycle.
#[derive(Error, Debug)]
pub enum SelectionError {
    /// History retrieval failed
    #[error("History provider error: {0}")]
    Upstream(#[from] HistoryError),

    /// No symbol had a fully aligned series this cycle
    #[error("No fully aligned price series could be built for the current universe")]
    NoAlignedData,

    /// Not enough aligned symbols to form a pair
    #[error("Insufficient symbols: need at least 2 aligned series, got {found}")]
    InsufficientSymbols { found: usize },

    /// Every off-diagonal correlation was undefined or excluded
    #[error("No candidate pair: all correlations are undefined or excluded")]
    NoCandidatePair,

    /// The best correlation found is below the configured minimum
    #[error("Best correlation {best:.4} is below minimum {minimum}")]
    NoQualifyingPair { best: f64, minimum: f64 },

    /// Another selection cycle is still running
    #[error("A selection cycle is already in progress")]
    CycleInProgress,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed correlation matrix input
    #[error("Invalid matrix: {0}")]
    InvalidMatrix(String),

    /// Malformed history data
    #[error("Data error: {0}")]
    Data(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SelectionError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SelectionError::Upstream(_) => "upstream_failure",
            SelectionError::NoAlignedData => "no_aligned_data",
            SelectionError::InsufficientSymbols { .. } => "insufficient_symbols",
            SelectionError::NoCandidatePair => "no_candidate_pair",
            SelectionError::NoQualifyingPair { .. } => "no_qualifying_pair",
            SelectionError::CycleInProgress => "cycle_in_progress",
            SelectionError::InvalidConfig(_) => "invalid_config",
            SelectionError::InvalidMatrix(_) => "invalid_matrix",
            SelectionError::Data(_) => "data",
            SelectionError::Io(_) => "io",
            SelectionError::Json(_) => "json",
        }
    }
}
