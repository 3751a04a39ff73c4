use thiserror::Error;

/// Errors produced by the flux and tempo pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Parameters rejected before any computation runs.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// No lag in the searched range produced a positive correlation.
    #[error("no tempo found between {min_bpm} and {max_bpm} BPM (supply more audio or widen the range)")]
    NoTempoFound { min_bpm: f64, max_bpm: f64 },

    /// Extraction aborted between batches; no partial curve is returned.
    #[error("analysis cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

pub(crate) fn invalid(msg: impl Into<String>) -> AnalysisError {
    AnalysisError::InvalidConfiguration(msg.into())
}
