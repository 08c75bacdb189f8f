//! Expectation-Maximization for the kinematic model's noise parameters.
//!
//! Each iteration smooths the series under the current parameters
//! (E-step) and replaces the learned parameters by their closed-form
//! maximizers of the expected complete-data log-likelihood (M-step,
//! Shumway & Stoffer 1982).

use tracing::{debug, warn};

use crate::config::{EmConfig, OnNonConvergence};
use crate::error::KcaError;
use crate::kalman::{self, SmoothPass};
use crate::small_linalg::{SmallMat, StateCovariance};
use crate::state_space::StateSpace;

/// How an EM run ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EmStatus {
    /// `max_iter` was zero; the seed model was used unchanged.
    Disabled,
    /// The log-likelihood change fell within tolerance.
    Converged {
        /// M-steps performed.
        iterations: usize,
    },
    /// The iteration cap was hit; the best model seen is returned.
    NotConverged {
        /// M-steps performed.
        iterations: usize,
        /// Absolute log-likelihood change of the final iteration.
        improvement: f64,
    },
}

impl EmStatus {
    /// Returns `true` unless the run hit its cap without converging.
    pub fn is_converged(&self) -> bool {
        !matches!(self, EmStatus::NotConverged { .. })
    }

    /// M-steps performed.
    pub fn iterations(&self) -> usize {
        match *self {
            EmStatus::Disabled => 0,
            EmStatus::Converged { iterations } | EmStatus::NotConverged { iterations, .. } => {
                iterations
            }
        }
    }
}

/// Result of [`estimate`].
#[derive(Clone, Debug)]
pub struct Estimate {
    model: StateSpace,
    status: EmStatus,
    log_likelihood: f64,
}

impl Estimate {
    /// The refined model.
    pub fn model(&self) -> &StateSpace {
        &self.model
    }

    /// How the run ended.
    pub fn status(&self) -> EmStatus {
        self.status
    }

    /// Log-likelihood of the observations under [`Estimate::model`].
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Consumes the estimate, returning the model.
    pub fn into_model(self) -> StateSpace {
        self.model
    }
}

/// Refines the learned parameters of `seed` against `z` by EM.
///
/// Iterates until the absolute log-likelihood change is within
/// `config.tolerance()` or `config.max_iter()` M-steps have been taken.
/// On the cap the best model seen (highest log-likelihood) is returned
/// tagged [`EmStatus::NotConverged`], unless the policy is
/// [`OnNonConvergence::Fail`].
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`KcaError::InvalidConfig`] | `config` fails validation |
/// | [`KcaError::NumericalInstability`] | a covariance turns singular or indefinite |
/// | [`KcaError::NonConvergence`] | cap reached under [`OnNonConvergence::Fail`] |
#[tracing::instrument(skip_all, fields(n = z.len(), max_iter = config.max_iter()))]
pub fn estimate(seed: &StateSpace, z: &[f64], config: &EmConfig) -> Result<Estimate, KcaError> {
    config.validate()?;

    let mut model = seed.clone();
    let mut pass = kalman::smooth(&model, z)?;
    let mut ll = pass.log_likelihood();

    if config.max_iter() == 0 {
        return Ok(Estimate {
            model,
            status: EmStatus::Disabled,
            log_likelihood: ll,
        });
    }

    let mut best = (model.clone(), ll);
    let mut improvement = f64::INFINITY;

    for iteration in 1..=config.max_iter() {
        model = maximize(&model, &pass, z, config, iteration)?;
        pass = kalman::smooth(&model, z)?;
        let next_ll = pass.log_likelihood();
        improvement = (next_ll - ll).abs();
        ll = next_ll;
        debug!(iteration, log_likelihood = ll, improvement, "EM iteration");

        if ll > best.1 {
            best = (model.clone(), ll);
        }
        if improvement <= config.tolerance() {
            return Ok(Estimate {
                model,
                status: EmStatus::Converged { iterations: iteration },
                log_likelihood: ll,
            });
        }
    }

    let iterations = config.max_iter();
    match config.on_non_convergence() {
        OnNonConvergence::Fail => Err(KcaError::NonConvergence {
            iterations,
            improvement,
        }),
        OnNonConvergence::Warn => {
            warn!(
                iterations,
                improvement,
                log_likelihood = best.1,
                "EM reached iteration cap without converging; using best model"
            );
            Ok(Estimate {
                model: best.0,
                status: EmStatus::NotConverged {
                    iterations,
                    improvement,
                },
                log_likelihood: best.1,
            })
        }
    }
}

/// M-step: closed-form maximizers given the smoothed moments in `pass`.
///
/// ```text
/// Q  = 1/(n-1) Σ [e eᵀ + A P[t] Aᵀ + P[t+1] - C[t] Aᵀ - A C[t]ᵀ],  e = m[t+1] - A m[t]
/// R  = 1/n Σ [(z[t] - m[t]₀)² + P[t]₀₀]
/// mu0 = m[0],  P0 = P[0]
/// ```
///
/// where `C[t] = Cov(x[t+1], x[t] | z)`. Learned variances are floored at
/// `config.min_variance()`.
fn maximize(
    model: &StateSpace,
    pass: &SmoothPass,
    z: &[f64],
    config: &EmConfig,
    iteration: usize,
) -> Result<StateSpace, KcaError> {
    let learned = config.learned();
    let floor = config.min_variance();
    let means = pass.means();
    let covs = pass.covariances();
    let n = z.len();
    let mut next = model.clone();

    if learned.process && n > 1 {
        let a = *model.transition();
        let a_t = a.transpose();
        let mut acc = StateCovariance::zeros();
        for (t, cross) in pass.cross_covariances().iter().enumerate() {
            let err = means[t + 1] - a * means[t];
            let cross_a = *cross * a_t;
            acc = acc + SmallMat::outer(&err, &err) + a.sandwich(&covs[t]) + covs[t + 1]
                - cross_a
                - cross_a.transpose();
        }
        let q = acc
            .scale(1.0 / (n - 1) as f64)
            .symmetrized()
            .with_diagonal_floor(floor);
        if !q.is_positive_semidefinite() {
            return Err(KcaError::unstable("em", iteration));
        }
        next = next.with_process_covariance(q);
    }

    if learned.observation {
        let r = z
            .iter()
            .zip(means.iter().zip(covs))
            .map(|(&obs, (m, p))| {
                let resid = obs - m.get(0);
                resid * resid + p.get(0, 0)
            })
            .sum::<f64>()
            / n as f64;
        if !r.is_finite() {
            return Err(KcaError::unstable("em", iteration));
        }
        next = next.with_observation_variance(r.max(floor));
    }

    if learned.initial_state {
        let p0 = covs[0].with_diagonal_floor(floor);
        if !p0.is_positive_semidefinite() {
            return Err(KcaError::unstable("em", iteration));
        }
        next = next.with_initial_state(means[0], p0);
    }

    Ok(next)
}
