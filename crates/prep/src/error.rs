//! Error types for kca-prep.

/// Error type for all fallible operations in the kca-prep crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PrepError {
    /// Returned when fewer points are supplied than the operation needs.
    #[error("insufficient data: got {n} points, need at least {min}")]
    InsufficientData {
        /// Number of points provided.
        n: usize,
        /// Minimum number required.
        min: usize,
    },

    /// Returned when the time span is not finite and positive.
    #[error("time span must be finite and positive, got {span}")]
    InvalidSpan {
        /// The rejected span.
        span: f64,
    },

    /// Returned when a series value is NaN or infinite.
    #[error("non-finite value at index {index}")]
    NonFinite {
        /// Position of the first offending value.
        index: usize,
    },
}
