//! Configuration for EM parameter estimation.

use crate::error::KcaError;

/// What to do when EM reaches its iteration cap without converging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnNonConvergence {
    /// Keep the best model seen so far, flag it, and log a warning.
    #[default]
    Warn,
    /// Return [`KcaError::NonConvergence`].
    Fail,
}

/// Which parameter groups the M-step re-estimates.
///
/// Groups left `false` keep their seed values for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Learned {
    /// Process covariance `Q`.
    pub process: bool,
    /// Observation variance `R`.
    pub observation: bool,
    /// Initial state mean and covariance.
    pub initial_state: bool,
}

impl Learned {
    /// Learn every parameter group.
    pub fn all() -> Self {
        Self {
            process: true,
            observation: true,
            initial_state: true,
        }
    }

    /// Learn only the process covariance.
    pub fn process_only() -> Self {
        Self {
            process: true,
            observation: false,
            initial_state: false,
        }
    }
}

impl Default for Learned {
    fn default() -> Self {
        Self::all()
    }
}

/// Configuration for the EM estimator.
///
/// # Example
///
/// ```
/// use kca_kalman::{EmConfig, Learned, OnNonConvergence};
///
/// let config = EmConfig::new()
///     .with_max_iter(50)
///     .with_tolerance(1e-6)
///     .with_learned(Learned::process_only())
///     .with_on_non_convergence(OnNonConvergence::Fail);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EmConfig {
    /// Iteration cap. Zero disables estimation.
    max_iter: usize,
    /// Absolute log-likelihood change that counts as converged.
    tolerance: f64,
    /// Parameter groups to re-estimate.
    learned: Learned,
    /// Floor applied to learned variances.
    min_variance: f64,
    /// Policy when the cap is reached.
    on_non_convergence: OnNonConvergence,
}

impl EmConfig {
    /// Creates a configuration with defaults.
    ///
    /// Defaults: `max_iter = 100`, `tolerance = 1e-4`, all groups learned,
    /// `min_variance = 1e-9`, warn on non-convergence.
    pub fn new() -> Self {
        Self {
            max_iter: 100,
            tolerance: 1e-4,
            learned: Learned::all(),
            min_variance: 1e-9,
            on_non_convergence: OnNonConvergence::Warn,
        }
    }

    /// Sets the iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the convergence tolerance on the log-likelihood.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets which parameter groups are learned.
    pub fn with_learned(mut self, learned: Learned) -> Self {
        self.learned = learned;
        self
    }

    /// Sets the variance floor.
    pub fn with_min_variance(mut self, min_variance: f64) -> Self {
        self.min_variance = min_variance;
        self
    }

    /// Sets the non-convergence policy.
    pub fn with_on_non_convergence(mut self, policy: OnNonConvergence) -> Self {
        self.on_non_convergence = policy;
        self
    }

    /// Returns the iteration cap.
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Returns the convergence tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Returns the learned parameter groups.
    pub fn learned(&self) -> Learned {
        self.learned
    }

    /// Returns the variance floor.
    pub fn min_variance(&self) -> f64 {
        self.min_variance
    }

    /// Returns the non-convergence policy.
    pub fn on_non_convergence(&self) -> OnNonConvergence {
        self.on_non_convergence
    }

    /// Validates this configuration.
    ///
    /// Returns an error if the tolerance is negative or non-finite, or the
    /// variance floor is non-finite or non-positive.
    pub fn validate(&self) -> Result<(), KcaError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(KcaError::InvalidConfig {
                reason: format!("tolerance must be finite and >= 0, got {}", self.tolerance),
            });
        }
        if !self.min_variance.is_finite() || self.min_variance <= 0.0 {
            return Err(KcaError::InvalidConfig {
                reason: format!(
                    "min_variance must be finite and positive, got {}",
                    self.min_variance
                ),
            });
        }
        Ok(())
    }
}

impl Default for EmConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EmConfig::default();
        assert_eq!(cfg.max_iter(), 100);
        assert!((cfg.tolerance() - 1e-4).abs() < f64::EPSILON);
        assert_eq!(cfg.learned(), Learned::all());
        assert!((cfg.min_variance() - 1e-9).abs() < f64::EPSILON);
        assert_eq!(cfg.on_non_convergence(), OnNonConvergence::Warn);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_builder_chaining() {
        let cfg = EmConfig::new()
            .with_max_iter(5)
            .with_tolerance(0.0)
            .with_learned(Learned::process_only())
            .with_min_variance(1e-6)
            .with_on_non_convergence(OnNonConvergence::Fail);
        assert_eq!(cfg.max_iter(), 5);
        assert_eq!(cfg.tolerance(), 0.0);
        assert!(cfg.learned().process);
        assert!(!cfg.learned().observation);
        assert!(!cfg.learned().initial_state);
        assert_eq!(cfg.min_variance(), 1e-6);
        assert_eq!(cfg.on_non_convergence(), OnNonConvergence::Fail);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_tolerance() {
        let err = EmConfig::new().with_tolerance(-1.0).validate().unwrap_err();
        assert!(matches!(err, KcaError::InvalidConfig { .. }));
        let err = EmConfig::new().with_tolerance(f64::NAN).validate().unwrap_err();
        assert!(matches!(err, KcaError::InvalidConfig { .. }));
    }

    #[test]
    fn test_invalid_min_variance() {
        let err = EmConfig::new().with_min_variance(0.0).validate().unwrap_err();
        assert!(matches!(err, KcaError::InvalidConfig { .. }));
        let err = EmConfig::new()
            .with_min_variance(f64::INFINITY)
            .validate()
            .unwrap_err();
        assert!(matches!(err, KcaError::InvalidConfig { .. }));
    }
}
