//! Fitted KCA results.

use ndarray::Array2;

use crate::em::EmStatus;
use crate::small_linalg::{StateCovariance, StateVector};
use crate::state_space::StateSpace;
use crate::trajectory::Trajectory;

/// Result of [`KcaSpec::fit()`](crate::KcaSpec::fit).
///
/// The first [`KcaFit::n_observed()`] entries are smoothed estimates; the
/// remaining [`KcaFit::forecast_horizon()`] entries are pure predictions.
///
/// ```mermaid
/// graph LR
///     B["KcaFit"] --> C[".positions() / .velocities() / .accelerations()"]
///     B --> D[".stdevs(): (n + k) x 3"]
///     B --> E[".covariances()"]
///     B --> F[".model(): refined noise parameters"]
///     B --> G[".em_status()"]
/// ```
#[derive(Clone, Debug)]
pub struct KcaFit {
    trajectory: Trajectory,
    stdevs: Array2<f64>,
    model: StateSpace,
    em_status: EmStatus,
    log_likelihood: f64,
    n_observed: usize,
    forecast_horizon: usize,
}

impl KcaFit {
    pub(crate) fn new(
        trajectory: Trajectory,
        stdevs: Array2<f64>,
        model: StateSpace,
        em_status: EmStatus,
        log_likelihood: f64,
        n_observed: usize,
        forecast_horizon: usize,
    ) -> Self {
        Self {
            trajectory,
            stdevs,
            model,
            em_status,
            log_likelihood,
            n_observed,
            forecast_horizon,
        }
    }

    /// Total number of steps, `n_observed + forecast_horizon`.
    pub fn len(&self) -> usize {
        self.trajectory.len()
    }

    /// Returns `true` if there are no steps.
    pub fn is_empty(&self) -> bool {
        self.trajectory.is_empty()
    }

    /// Number of observed (smoothed) steps.
    pub fn n_observed(&self) -> usize {
        self.n_observed
    }

    /// Number of forecast steps.
    pub fn forecast_horizon(&self) -> usize {
        self.forecast_horizon
    }

    /// The full trajectory.
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// State means, one per step.
    pub fn means(&self) -> &[StateVector] {
        self.trajectory.means()
    }

    /// State covariances, one per step.
    pub fn covariances(&self) -> &[StateCovariance] {
        self.trajectory.covariances()
    }

    /// Marginal standard deviations, shape `(len, 3)`.
    pub fn stdevs(&self) -> &Array2<f64> {
        &self.stdevs
    }

    /// Position component of every mean.
    pub fn positions(&self) -> Vec<f64> {
        self.trajectory.component(0)
    }

    /// Velocity component of every mean.
    pub fn velocities(&self) -> Vec<f64> {
        self.trajectory.component(1)
    }

    /// Acceleration component of every mean.
    pub fn accelerations(&self) -> Vec<f64> {
        self.trajectory.component(2)
    }

    /// The model after EM refinement.
    pub fn model(&self) -> &StateSpace {
        &self.model
    }

    /// How the EM run ended.
    pub fn em_status(&self) -> EmStatus {
        self.em_status
    }

    /// Log-likelihood of the observations under [`KcaFit::model()`].
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Returns `true` if step `index` lies beyond the observed range.
    pub fn is_forecast(&self, index: usize) -> bool {
        index >= self.n_observed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uncertainty::marginal_stdevs;

    fn sample() -> KcaFit {
        let means = vec![
            StateVector::new([1.0, 0.5, 0.1]),
            StateVector::new([1.5, 0.6, 0.1]),
            StateVector::new([2.1, 0.7, 0.1]),
        ];
        let covs = vec![
            StateCovariance::identity(),
            StateCovariance::identity().scale(4.0),
            StateCovariance::identity().scale(9.0),
        ];
        let stdevs = marginal_stdevs(&covs);
        let model = StateSpace::kinematic(&[0.0, 1.0], 0.1).unwrap();
        KcaFit::new(
            Trajectory::new(means, covs),
            stdevs,
            model,
            EmStatus::Converged { iterations: 3 },
            -4.2,
            2,
            1,
        )
    }

    #[test]
    fn accessors() {
        let fit = sample();
        assert_eq!(fit.len(), 3);
        assert!(!fit.is_empty());
        assert_eq!(fit.n_observed(), 2);
        assert_eq!(fit.forecast_horizon(), 1);
        assert_eq!(fit.positions(), vec![1.0, 1.5, 2.1]);
        assert_eq!(fit.velocities(), vec![0.5, 0.6, 0.7]);
        assert_eq!(fit.accelerations(), vec![0.1, 0.1, 0.1]);
        assert_eq!(fit.stdevs()[[2, 1]], 3.0);
        assert_eq!(fit.log_likelihood(), -4.2);
        assert_eq!(fit.em_status().iterations(), 3);
    }

    #[test]
    fn forecast_boundary() {
        let fit = sample();
        assert!(!fit.is_forecast(0));
        assert!(!fit.is_forecast(1));
        assert!(fit.is_forecast(2));
    }
}
