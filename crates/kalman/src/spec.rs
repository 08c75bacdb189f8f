//! KCA model specification (unfitted).

use tracing::debug;

use crate::config::EmConfig;
use crate::em;
use crate::error::KcaError;
use crate::fit::KcaFit;
use crate::forecast::forecast;
use crate::kalman;
use crate::state_space::{DEFAULT_OBSERVATION_VARIANCE, DEFAULT_PRIOR_VARIANCE, StateSpace};
use crate::uncertainty::marginal_stdevs;

/// An unfitted kinetic component analysis.
///
/// Holds everything the pipeline needs apart from the data: the
/// process-noise seed `q`, the forecast horizon, the observation and prior
/// variance seeds, and the EM settings. Call [`KcaSpec::fit()`] to obtain a
/// [`KcaFit`].
///
/// ```mermaid
/// graph LR
///     A["KcaSpec::new(q)"] -->|".fit(&t, &z)?"| B["KcaFit"]
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct KcaSpec {
    q: f64,
    forecast_horizon: usize,
    observation_variance: f64,
    prior_variance: f64,
    em: EmConfig,
}

impl KcaSpec {
    /// Creates a specification with process-noise seed `Q = q * I`.
    ///
    /// Defaults: no forecast, observation variance
    /// [`DEFAULT_OBSERVATION_VARIANCE`], prior variance
    /// [`DEFAULT_PRIOR_VARIANCE`], [`EmConfig::default()`].
    ///
    /// # Example
    ///
    /// ```
    /// use kca_kalman::KcaSpec;
    ///
    /// let spec = KcaSpec::new(0.1).with_forecast_horizon(5);
    /// assert_eq!(spec.q(), 0.1);
    /// assert_eq!(spec.forecast_horizon(), 5);
    /// ```
    pub fn new(q: f64) -> Self {
        Self {
            q,
            forecast_horizon: 0,
            observation_variance: DEFAULT_OBSERVATION_VARIANCE,
            prior_variance: DEFAULT_PRIOR_VARIANCE,
            em: EmConfig::default(),
        }
    }

    /// Sets the number of predict-only steps appended after the data.
    pub fn with_forecast_horizon(mut self, horizon: usize) -> Self {
        self.forecast_horizon = horizon;
        self
    }

    /// Sets the observation variance seed `R`.
    pub fn with_observation_variance(mut self, r: f64) -> Self {
        self.observation_variance = r;
        self
    }

    /// Sets the variance of the initial-state prior.
    pub fn with_prior_variance(mut self, prior_variance: f64) -> Self {
        self.prior_variance = prior_variance;
        self
    }

    /// Sets the EM configuration.
    pub fn with_em(mut self, em: EmConfig) -> Self {
        self.em = em;
        self
    }

    /// Process-noise seed.
    pub fn q(&self) -> f64 {
        self.q
    }

    /// Forecast horizon.
    pub fn forecast_horizon(&self) -> usize {
        self.forecast_horizon
    }

    /// Observation variance seed.
    pub fn observation_variance(&self) -> f64 {
        self.observation_variance
    }

    /// Prior variance.
    pub fn prior_variance(&self) -> f64 {
        self.prior_variance
    }

    /// EM configuration.
    pub fn em(&self) -> &EmConfig {
        &self.em
    }

    /// Runs the full pipeline on time grid `t` and observations `z`.
    ///
    /// Builds the kinematic model, refines its noise parameters by EM,
    /// smooths the series under the refined model, extends the trajectory
    /// by the forecast horizon, and extracts marginal standard deviations.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`KcaError::LengthMismatch`] | `t.len() != z.len()` |
    /// | [`KcaError::InsufficientData`] | fewer than two points |
    /// | [`KcaError::NonIncreasingTime`] | `t` not strictly increasing |
    /// | [`KcaError::NonFiniteInput`] | NaN / infinity in `t`, `z`, or `q` |
    /// | [`KcaError::NegativeSeed`] | `q < 0` |
    /// | [`KcaError::InvalidConfig`] | bad variance seed or EM settings |
    /// | [`KcaError::NumericalInstability`] | a covariance degenerates |
    /// | [`KcaError::NonConvergence`] | EM cap reached under the fail policy |
    #[tracing::instrument(skip_all, fields(n = z.len(), q = self.q, horizon = self.forecast_horizon))]
    pub fn fit(&self, t: &[f64], z: &[f64]) -> Result<KcaFit, KcaError> {
        if t.len() != z.len() {
            return Err(KcaError::LengthMismatch {
                t: t.len(),
                z: z.len(),
            });
        }
        if !self.observation_variance.is_finite() || self.observation_variance <= 0.0 {
            return Err(KcaError::InvalidConfig {
                reason: format!(
                    "observation_variance must be finite and positive, got {}",
                    self.observation_variance
                ),
            });
        }
        self.em.validate()?;

        let seed = StateSpace::kinematic(t, self.q)?;
        if z.iter().any(|x| !x.is_finite()) {
            return Err(KcaError::NonFiniteInput {
                input: "observations",
            });
        }
        let seed = seed
            .with_observation_variance(self.observation_variance)
            .seeded_from(z, self.prior_variance)?;

        let estimate = em::estimate(&seed, z, &self.em)?;
        let status = estimate.status();
        let model = estimate.into_model();

        let pass = kalman::smooth(&model, z)?;
        let log_likelihood = pass.log_likelihood();
        let trajectory = forecast(pass.into_trajectory(), &model, self.forecast_horizon);
        let stdevs = marginal_stdevs(trajectory.covariances());

        debug!(
            log_likelihood,
            em_iterations = status.iterations(),
            r = model.observation_variance(),
            "KCA fit complete"
        );

        Ok(KcaFit::new(
            trajectory,
            stdevs,
            model,
            status,
            log_likelihood,
            z.len(),
            self.forecast_horizon,
        ))
    }
}

/// Converts a signed horizon from an outer boundary.
///
/// # Errors
///
/// Returns [`KcaError::NegativeHorizon`] if `horizon < 0`.
///
/// # Example
///
/// ```
/// use kca_kalman::checked_horizon;
///
/// assert_eq!(checked_horizon(3).unwrap(), 3);
/// assert!(checked_horizon(-1).is_err());
/// ```
pub fn checked_horizon(horizon: i64) -> Result<usize, KcaError> {
    usize::try_from(horizon).map_err(|_| KcaError::NegativeHorizon { horizon })
}

/// Fits with default settings: `KcaSpec::new(q).with_forecast_horizon(horizon)`.
///
/// # Errors
///
/// See [`KcaSpec::fit()`].
pub fn fit(t: &[f64], z: &[f64], q: f64, horizon: usize) -> Result<KcaFit, KcaError> {
    KcaSpec::new(q).with_forecast_horizon(horizon).fit(t, z)
}
