//! Forward Kalman filter and backward Rauch–Tung–Striebel smoother.
//!
//! Both passes are pure functions of a [`StateSpace`] and the observation
//! series. The filter also accumulates the exact Gaussian log-likelihood
//! via the prediction error decomposition, which the EM estimator uses as
//! its convergence measure.

use std::f64::consts::PI;

use crate::error::KcaError;
use crate::small_linalg::{SmallMat, StateCovariance, StateVector};
use crate::state_space::StateSpace;
use crate::trajectory::Trajectory;

/// Observation selector `H = (1, 0, 0)` as a vector.
const OBSERVE_POSITION: StateVector = StateVector {
    data: [1.0, 0.0, 0.0],
};

/// Output of the forward pass.
#[derive(Clone, Debug)]
pub struct FilterPass {
    pub(crate) predicted_means: Vec<StateVector>,
    pub(crate) predicted_covs: Vec<StateCovariance>,
    pub(crate) filtered_means: Vec<StateVector>,
    pub(crate) filtered_covs: Vec<StateCovariance>,
    pub(crate) log_likelihood: f64,
}

impl FilterPass {
    /// One-step-ahead predicted means `m[t|t-1]` (the prior at `t = 0`).
    pub fn predicted_means(&self) -> &[StateVector] {
        &self.predicted_means
    }

    /// One-step-ahead predicted covariances `P[t|t-1]`.
    pub fn predicted_covariances(&self) -> &[StateCovariance] {
        &self.predicted_covs
    }

    /// Filtered means `m[t|t]`.
    pub fn filtered_means(&self) -> &[StateVector] {
        &self.filtered_means
    }

    /// Filtered covariances `P[t|t]`.
    pub fn filtered_covariances(&self) -> &[StateCovariance] {
        &self.filtered_covs
    }

    /// Log-likelihood of the observations under the model.
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }
}

/// Output of the backward pass.
#[derive(Clone, Debug)]
pub struct SmoothPass {
    pub(crate) means: Vec<StateVector>,
    pub(crate) covs: Vec<StateCovariance>,
    /// `Cov(x[t+1], x[t] | z)` for `t = 0..n-1`.
    pub(crate) cross_covs: Vec<StateCovariance>,
    pub(crate) filter: FilterPass,
}

impl SmoothPass {
    /// Smoothed means `m[t|n]`.
    pub fn means(&self) -> &[StateVector] {
        &self.means
    }

    /// Smoothed covariances `P[t|n]`.
    pub fn covariances(&self) -> &[StateCovariance] {
        &self.covs
    }

    /// Lag-one cross covariances `Cov(x[t+1], x[t] | z)`, length `n - 1`.
    pub fn cross_covariances(&self) -> &[StateCovariance] {
        &self.cross_covs
    }

    /// The forward pass the smoother was run on.
    pub fn filter(&self) -> &FilterPass {
        &self.filter
    }

    /// Log-likelihood of the observations under the model.
    pub fn log_likelihood(&self) -> f64 {
        self.filter.log_likelihood
    }

    /// Consumes the pass, returning the smoothed trajectory.
    pub fn into_trajectory(self) -> Trajectory {
        Trajectory::new(self.means, self.covs)
    }
}

/// Runs the forward Kalman filter over `z`.
///
/// At `t = 0` the prior `(mu0, P0)` serves as the prediction; later steps
/// predict through the model. The covariance update uses the Joseph form
/// and is symmetrized so every filtered covariance stays symmetric PSD.
///
/// # Errors
///
/// Returns [`KcaError::NumericalInstability`] (stage `"filter"`) if the
/// innovation variance is not positive and finite, or any mean, covariance,
/// or the log-likelihood becomes non-finite or indefinite.
pub fn filter(model: &StateSpace, z: &[f64]) -> Result<FilterPass, KcaError> {
    let n = z.len();
    let r = model.observation_variance();

    let mut predicted_means = Vec::with_capacity(n);
    let mut predicted_covs = Vec::with_capacity(n);
    let mut filtered_means = Vec::with_capacity(n);
    let mut filtered_covs = Vec::with_capacity(n);
    let mut log_likelihood = 0.0;

    let mut mean = *model.initial_mean();
    let mut cov = *model.initial_covariance();

    for (step, &obs) in z.iter().enumerate() {
        if step > 0 {
            (mean, cov) = model.predict(&mean, &cov);
        }
        predicted_means.push(mean);
        predicted_covs.push(cov);

        let innovation_var = cov.get(0, 0) + r;
        if !innovation_var.is_finite() || innovation_var <= 0.0 {
            return Err(KcaError::unstable("filter", step));
        }
        let innovation = obs - mean.get(0);

        // K = P Hᵀ / S; P is symmetric so P Hᵀ is its first column.
        let gain = cov.column(0).scale(1.0 / innovation_var);
        mean = mean + gain.scale(innovation);

        // Joseph form: (I - K H) P (I - K H)ᵀ + K R Kᵀ
        let i_kh = StateCovariance::identity() - SmallMat::outer(&gain, &OBSERVE_POSITION);
        cov = (i_kh.sandwich(&cov) + SmallMat::outer(&gain, &gain).scale(r)).symmetrized();

        log_likelihood -= 0.5
            * ((2.0 * PI).ln() + innovation_var.ln() + innovation * innovation / innovation_var);

        if !log_likelihood.is_finite() || !mean.is_finite() || !cov.is_positive_semidefinite() {
            return Err(KcaError::unstable("filter", step));
        }

        filtered_means.push(mean);
        filtered_covs.push(cov);
    }

    Ok(FilterPass {
        predicted_means,
        predicted_covs,
        filtered_means,
        filtered_covs,
        log_likelihood,
    })
}

/// Runs the filter followed by the RTS smoother.
///
/// For `t = n-2 .. 0`:
///
/// ```text
/// J[t]   = P[t|t] Aᵀ P[t+1|t]⁻¹
/// m[t|n] = m[t|t] + J[t] (m[t+1|n] - m[t+1|t])
/// P[t|n] = P[t|t] + J[t] (P[t+1|n] - P[t+1|t]) J[t]ᵀ
/// ```
///
/// The lag-one cross covariance `P[t+1|n] J[t]ᵀ` is kept for the M-step.
///
/// # Errors
///
/// Propagates filter errors, and returns [`KcaError::NumericalInstability`]
/// (stage `"smoother"`) if a predicted covariance cannot be inverted or a
/// smoothed covariance is not PSD.
pub fn smooth(model: &StateSpace, z: &[f64]) -> Result<SmoothPass, KcaError> {
    let filter = filter(model, z)?;
    let n = z.len();

    let mut means = filter.filtered_means.clone();
    let mut covs = filter.filtered_covs.clone();
    let mut cross_covs = vec![StateCovariance::zeros(); n.saturating_sub(1)];
    let a_t = model.transition().transpose();

    for t in (0..n.saturating_sub(1)).rev() {
        let pred_inv = filter.predicted_covs[t + 1]
            .inverse()
            .ok_or_else(|| KcaError::unstable("smoother", t + 1))?;
        let gain = filter.filtered_covs[t] * a_t * pred_inv;

        means[t] = filter.filtered_means[t] + gain * (means[t + 1] - filter.predicted_means[t + 1]);
        covs[t] = (filter.filtered_covs[t]
            + gain.sandwich(&(covs[t + 1] - filter.predicted_covs[t + 1])))
        .symmetrized();

        if !means[t].is_finite() || !covs[t].is_positive_semidefinite() {
            return Err(KcaError::unstable("smoother", t));
        }
        cross_covs[t] = covs[t + 1] * gain.transpose();
    }

    Ok(SmoothPass {
        means,
        covs,
        cross_covs,
        filter,
    })
}
