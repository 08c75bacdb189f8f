//! Ordered sequence of state estimates.

use crate::small_linalg::{StateCovariance, StateVector};

/// Index-aligned state means and covariances.
///
/// Produced by the smoother (one entry per observation) and extended by the
/// forecaster (one entry per extrapolated step).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    means: Vec<StateVector>,
    covariances: Vec<StateCovariance>,
}

impl Trajectory {
    /// Builds a trajectory from parallel sequences.
    ///
    /// # Panics
    ///
    /// Panics if the sequences differ in length.
    pub fn new(means: Vec<StateVector>, covariances: Vec<StateCovariance>) -> Self {
        assert_eq!(
            means.len(),
            covariances.len(),
            "Trajectory::new: means and covariances must have equal length"
        );
        Self { means, covariances }
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.means.len()
    }

    /// Returns `true` if the trajectory has no steps.
    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    /// State means.
    pub fn means(&self) -> &[StateVector] {
        &self.means
    }

    /// State covariances.
    pub fn covariances(&self) -> &[StateCovariance] {
        &self.covariances
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<(&StateVector, &StateCovariance)> {
        self.means.last().zip(self.covariances.last())
    }

    /// Appends one entry.
    pub fn push(&mut self, mean: StateVector, covariance: StateCovariance) {
        self.means.push(mean);
        self.covariances.push(covariance);
    }

    /// Component `i` of every mean (0 = position, 1 = velocity,
    /// 2 = acceleration).
    pub fn component(&self, i: usize) -> Vec<f64> {
        self.means.iter().map(|m| m.get(i)).collect()
    }

    /// Consumes the trajectory, returning its parts.
    pub fn into_parts(self) -> (Vec<StateVector>, Vec<StateCovariance>) {
        (self.means, self.covariances)
    }
}
