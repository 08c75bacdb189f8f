//! Kinematic state-space model.
//!
//! ```text
//! x[t+1] = A * x[t] + w[t],   w[t] ~ N(0, Q)     (state transition)
//! z[t]   = H * x[t] + v[t],   v[t] ~ N(0, R)     (observation)
//! x[0]   ~ N(mu0, P0)
//! ```
//!
//! The state is `(position, velocity, acceleration)`, `A` encodes
//! constant-acceleration motion over one grid step `h`, and `H = (1, 0, 0)`
//! observes the position only.

use crate::error::KcaError;
use crate::small_linalg::{SmallMat, SmallVec, StateCovariance, StateVector};

/// Observation variance used when no other value is given.
pub const DEFAULT_OBSERVATION_VARIANCE: f64 = 1.0;

/// Variance of the seeded initial-state prior.
pub const DEFAULT_PRIOR_VARIANCE: f64 = 1.0e4;

/// Linear-Gaussian kinematic model.
///
/// `transition` is fixed by the time grid; every other parameter may be
/// replaced by the EM estimator, which always returns a new value rather
/// than mutating in place.
#[derive(Clone, Debug, PartialEq)]
pub struct StateSpace {
    step: f64,
    transition: StateCovariance,
    process_cov: StateCovariance,
    observation_var: f64,
    initial_mean: StateVector,
    initial_cov: StateCovariance,
}

impl StateSpace {
    /// Builds the kinematic model for time grid `t` with seed `Q = q * I`.
    ///
    /// The step is `h = (t[n-1] - t[0]) / n`. The initial state is zero with
    /// [`DEFAULT_PRIOR_VARIANCE`] and the observation variance is
    /// [`DEFAULT_OBSERVATION_VARIANCE`]; use [`StateSpace::seeded_from`] to
    /// centre the prior on the data.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`KcaError::InsufficientData`] | `t.len() < 2` |
    /// | [`KcaError::NonFiniteInput`] | `t` or `q` contains NaN / infinity |
    /// | [`KcaError::NonIncreasingTime`] | `t` not strictly increasing |
    /// | [`KcaError::NegativeSeed`] | `q < 0` |
    ///
    /// # Example
    ///
    /// ```
    /// use kca_kalman::StateSpace;
    ///
    /// let model = StateSpace::kinematic(&[0.0, 1.0, 2.0, 3.0], 0.01).unwrap();
    /// assert_eq!(model.step(), 0.75);
    /// assert_eq!(model.transition().get(0, 1), 0.75);
    /// ```
    pub fn kinematic(t: &[f64], q: f64) -> Result<Self, KcaError> {
        validate_time_grid(t)?;
        if !q.is_finite() {
            return Err(KcaError::NonFiniteInput { input: "q" });
        }
        if q < 0.0 {
            return Err(KcaError::NegativeSeed { q });
        }

        let n = t.len();
        let h = (t[n - 1] - t[0]) / n as f64;

        Ok(Self {
            step: h,
            transition: kinematic_transition(h),
            process_cov: StateCovariance::identity().scale(q),
            observation_var: DEFAULT_OBSERVATION_VARIANCE,
            initial_mean: StateVector::zeros(),
            initial_cov: StateCovariance::identity().scale(DEFAULT_PRIOR_VARIANCE),
        })
    }

    /// Centres the initial-state prior on the first observation.
    ///
    /// Mean is `(z[0], 0, 0)`; covariance is `prior_variance * I`, which
    /// should be large so the prior is quickly overruled by the data.
    ///
    /// # Errors
    ///
    /// Returns [`KcaError::InsufficientData`] if `z` is empty and
    /// [`KcaError::InvalidConfig`] if `prior_variance` is not finite and
    /// positive.
    pub fn seeded_from(self, z: &[f64], prior_variance: f64) -> Result<Self, KcaError> {
        let Some(&first) = z.first() else {
            return Err(KcaError::InsufficientData { n: 0, min: 1 });
        };
        if !prior_variance.is_finite() || prior_variance <= 0.0 {
            return Err(KcaError::InvalidConfig {
                reason: format!("prior_variance must be finite and positive, got {prior_variance}"),
            });
        }
        Ok(self.with_initial_state(
            SmallVec::new([first, 0.0, 0.0]),
            StateCovariance::identity().scale(prior_variance),
        ))
    }

    /// Replaces the observation variance `R`.
    pub fn with_observation_variance(mut self, r: f64) -> Self {
        self.observation_var = r;
        self
    }

    /// Replaces the process covariance `Q`.
    pub fn with_process_covariance(mut self, q: StateCovariance) -> Self {
        self.process_cov = q;
        self
    }

    /// Replaces the initial-state prior.
    pub fn with_initial_state(mut self, mean: StateVector, cov: StateCovariance) -> Self {
        self.initial_mean = mean;
        self.initial_cov = cov;
        self
    }

    /// Grid step `h`.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Transition matrix `A`.
    pub fn transition(&self) -> &StateCovariance {
        &self.transition
    }

    /// Process covariance `Q`.
    pub fn process_covariance(&self) -> &StateCovariance {
        &self.process_cov
    }

    /// Observation variance `R`.
    pub fn observation_variance(&self) -> f64 {
        self.observation_var
    }

    /// Initial state mean `mu0`.
    pub fn initial_mean(&self) -> &StateVector {
        &self.initial_mean
    }

    /// Initial state covariance `P0`.
    pub fn initial_covariance(&self) -> &StateCovariance {
        &self.initial_cov
    }

    /// One predict step: `(A m, A P Aᵀ + Q)`.
    pub fn predict(
        &self,
        mean: &StateVector,
        cov: &StateCovariance,
    ) -> (StateVector, StateCovariance) {
        let mean = self.transition * *mean;
        let cov = (self.transition.sandwich(cov) + self.process_cov).symmetrized();
        (mean, cov)
    }
}

/// Constant-acceleration transition over step `h`.
fn kinematic_transition(h: f64) -> StateCovariance {
    SmallMat::from_rows([
        [1.0, h, 0.5 * h * h],
        [0.0, 1.0, h],
        [0.0, 0.0, 1.0],
    ])
}

/// Checks length, finiteness, and strict monotonicity of a time grid.
pub(crate) fn validate_time_grid(t: &[f64]) -> Result<(), KcaError> {
    if t.len() < 2 {
        return Err(KcaError::InsufficientData { n: t.len(), min: 2 });
    }
    if t.iter().any(|x| !x.is_finite()) {
        return Err(KcaError::NonFiniteInput { input: "time grid" });
    }
    if let Some(index) = t.windows(2).position(|w| w[1] <= w[0]) {
        return Err(KcaError::NonIncreasingTime { index: index + 1 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn step_uses_n_divisor() {
        let ss = StateSpace::kinematic(&[0.0, 1.0, 2.0, 3.0], 0.01).unwrap();
        assert_abs_diff_eq!(ss.step(), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn transition_is_constant_acceleration() {
        let ss = StateSpace::kinematic(&[0.0, 2.0], 0.0).unwrap();
        let h = 1.0;
        let a = ss.transition();
        // A = [[1, h, h²/2], [0, 1, h], [0, 0, 1]]
        assert_abs_diff_eq!(a.get(0, 0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(a.get(0, 1), h, epsilon = 1e-12);
        assert_abs_diff_eq!(a.get(0, 2), 0.5 * h * h, epsilon = 1e-12);
        assert_abs_diff_eq!(a.get(1, 0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(a.get(1, 1), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(a.get(1, 2), h, epsilon = 1e-12);
        assert_abs_diff_eq!(a.get(2, 0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(a.get(2, 1), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(a.get(2, 2), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn seed_process_covariance_is_scaled_identity() {
        let ss = StateSpace::kinematic(&[0.0, 1.0, 2.0], 0.25).unwrap();
        let q = ss.process_covariance();
        for r in 0..3 {
            for c in 0..3 {
                let expected = if r == c { 0.25 } else { 0.0 };
                assert_abs_diff_eq!(q.get(r, c), expected, epsilon = 1e-15);
            }
        }
        assert_abs_diff_eq!(ss.observation_variance(), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn predict_moves_state_kinematically() {
        let ss = StateSpace::kinematic(&[0.0, 2.0], 0.0).unwrap();
        let mean = SmallVec::new([1.0, 2.0, 4.0]);
        let (next, cov) = ss.predict(&mean, &StateCovariance::zeros());
        // p + v h + a h²/2 = 1 + 2 + 2, v + a h = 6, a = 4
        assert_eq!(next.to_array(), [5.0, 6.0, 4.0]);
        assert_eq!(cov, StateCovariance::zeros());
    }

    #[test]
    fn seeded_prior_centres_on_first_observation() {
        let ss = StateSpace::kinematic(&[0.0, 1.0, 2.0, 3.0], 0.1)
            .unwrap()
            .seeded_from(&[1.0, 2.5, 3.0, 3.5], 100.0)
            .unwrap();
        let mean = ss.initial_mean();
        assert_abs_diff_eq!(mean.get(0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mean.get(1), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mean.get(2), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ss.initial_covariance().trace(), 300.0, epsilon = 1e-9);
    }

    #[test]
    fn rejects_short_grid() {
        let err = StateSpace::kinematic(&[0.0], 0.1).unwrap_err();
        assert!(matches!(err, KcaError::InsufficientData { n: 1, min: 2 }));
        let err = StateSpace::kinematic(&[], 0.1).unwrap_err();
        assert!(matches!(err, KcaError::InsufficientData { n: 0, .. }));
    }

    #[test]
    fn rejects_negative_seed() {
        let err = StateSpace::kinematic(&[0.0, 1.0], -0.1).unwrap_err();
        assert!(matches!(err, KcaError::NegativeSeed { .. }));
    }

    #[test]
    fn rejects_non_increasing_grid() {
        let err = StateSpace::kinematic(&[0.0, 1.0, 1.0, 2.0], 0.1).unwrap_err();
        assert!(matches!(err, KcaError::NonIncreasingTime { index: 2 }));
        let err = StateSpace::kinematic(&[3.0, 2.0], 0.1).unwrap_err();
        assert!(matches!(err, KcaError::NonIncreasingTime { index: 1 }));
    }

    #[test]
    fn rejects_non_finite() {
        let err = StateSpace::kinematic(&[0.0, f64::NAN], 0.1).unwrap_err();
        assert!(matches!(err, KcaError::NonFiniteInput { .. }));
        let err = StateSpace::kinematic(&[0.0, 1.0], f64::INFINITY).unwrap_err();
        assert!(matches!(err, KcaError::NonFiniteInput { input: "q" }));
    }

    #[test]
    fn seeded_from_rejects_bad_prior() {
        let ss = StateSpace::kinematic(&[0.0, 1.0], 0.1).unwrap();
        let err = ss.clone().seeded_from(&[1.0, 2.0], 0.0).unwrap_err();
        assert!(matches!(err, KcaError::InvalidConfig { .. }));
        let err = ss.seeded_from(&[], 10.0).unwrap_err();
        assert!(matches!(err, KcaError::InsufficientData { .. }));
    }

    #[test]
    fn send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StateSpace>();
    }
}
