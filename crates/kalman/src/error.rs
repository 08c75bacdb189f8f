//! Error types for the kca-kalman crate.

/// The three failure classes a caller needs to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or mismatched inputs, or an invalid configuration.
    InvalidInput,
    /// A covariance lost invertibility, finiteness, or positive
    /// semi-definiteness.
    NumericalInstability,
    /// EM hit its iteration cap under the hard-fail policy.
    NonConvergence,
}

impl ErrorKind {
    /// Stable snake_case name, suitable for machine-readable responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NumericalInstability => "numerical_instability",
            ErrorKind::NonConvergence => "non_convergence",
        }
    }
}

/// Error type for all fallible operations in the kca-kalman crate.
///
/// Variants are specific enough to report precisely; [`KcaError::kind()`]
/// collapses them onto [`ErrorKind`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum KcaError {
    /// Returned when the time grid has fewer points than required.
    #[error("insufficient data: got {n} observations, need at least {min}")]
    InsufficientData {
        /// Number of observations provided.
        n: usize,
        /// Minimum number of observations required.
        min: usize,
    },

    /// Returned when the time grid and observations differ in length.
    #[error("length mismatch: time grid has {t} points, observations have {z}")]
    LengthMismatch {
        /// Length of the time grid.
        t: usize,
        /// Length of the observation series.
        z: usize,
    },

    /// Returned when the time grid is not strictly increasing.
    #[error("time grid must be strictly increasing (violated at index {index})")]
    NonIncreasingTime {
        /// First index whose timestamp does not exceed its predecessor.
        index: usize,
    },

    /// Returned when an input contains NaN or infinity.
    #[error("non-finite value in {input}")]
    NonFiniteInput {
        /// Name of the offending input.
        input: &'static str,
    },

    /// Returned when the process-noise seed is negative.
    #[error("process noise seed q must be >= 0, got {q}")]
    NegativeSeed {
        /// The invalid seed.
        q: f64,
    },

    /// Returned when a signed forecast horizon is negative.
    #[error("forecast horizon must be >= 0, got {horizon}")]
    NegativeHorizon {
        /// The invalid horizon.
        horizon: i64,
    },

    /// Returned when a configuration value is out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the invalid setting.
        reason: String,
    },

    /// Returned when a covariance becomes singular, non-finite, or
    /// indefinite.
    #[error("numerical instability in {stage} at step {step}")]
    NumericalInstability {
        /// Pipeline stage that detected the failure.
        stage: &'static str,
        /// Time step (or EM iteration) at which it was detected.
        step: usize,
    },

    /// Returned when EM exhausts its iteration cap under
    /// [`OnNonConvergence::Fail`](crate::OnNonConvergence::Fail).
    #[error("EM did not converge after {iterations} iterations (last improvement {improvement:e})")]
    NonConvergence {
        /// Iterations performed.
        iterations: usize,
        /// Absolute log-likelihood change of the final iteration.
        improvement: f64,
    },
}

impl KcaError {
    /// Returns the failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            KcaError::NumericalInstability { .. } => ErrorKind::NumericalInstability,
            KcaError::NonConvergence { .. } => ErrorKind::NonConvergence,
            _ => ErrorKind::InvalidInput,
        }
    }

    pub(crate) fn unstable(stage: &'static str, step: usize) -> Self {
        KcaError::NumericalInstability { stage, step }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_insufficient_data() {
        let err = KcaError::InsufficientData { n: 1, min: 2 };
        assert_eq!(
            err.to_string(),
            "insufficient data: got 1 observations, need at least 2"
        );
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn error_length_mismatch() {
        let err = KcaError::LengthMismatch { t: 4, z: 3 };
        assert_eq!(
            err.to_string(),
            "length mismatch: time grid has 4 points, observations have 3"
        );
    }

    #[test]
    fn error_non_increasing_time() {
        let err = KcaError::NonIncreasingTime { index: 2 };
        assert_eq!(
            err.to_string(),
            "time grid must be strictly increasing (violated at index 2)"
        );
    }

    #[test]
    fn error_negative_seed() {
        let err = KcaError::NegativeSeed { q: -0.5 };
        assert_eq!(err.to_string(), "process noise seed q must be >= 0, got -0.5");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn error_negative_horizon() {
        let err = KcaError::NegativeHorizon { horizon: -3 };
        assert_eq!(err.to_string(), "forecast horizon must be >= 0, got -3");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn error_numerical_instability() {
        let err = KcaError::unstable("smoother", 7);
        assert_eq!(err.to_string(), "numerical instability in smoother at step 7");
        assert_eq!(err.kind(), ErrorKind::NumericalInstability);
    }

    #[test]
    fn error_non_convergence() {
        let err = KcaError::NonConvergence {
            iterations: 10,
            improvement: 0.5,
        };
        assert_eq!(
            err.to_string(),
            "EM did not converge after 10 iterations (last improvement 5e-1)"
        );
        assert_eq!(err.kind(), ErrorKind::NonConvergence);
    }

    #[test]
    fn kind_names() {
        assert_eq!(ErrorKind::InvalidInput.as_str(), "invalid_input");
        assert_eq!(
            ErrorKind::NumericalInstability.as_str(),
            "numerical_instability"
        );
        assert_eq!(ErrorKind::NonConvergence.as_str(), "non_convergence");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<KcaError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<KcaError>();
    }
}
