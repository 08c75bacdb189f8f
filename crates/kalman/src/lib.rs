//! # kca-kalman
//!
//! Kinetic component analysis: recovers position, velocity and
//! acceleration from a noisy one-dimensional series with a kinematic
//! linear-Gaussian state-space model, a Kalman filter plus
//! Rauch–Tung–Striebel smoother, and EM-refined noise parameters.
//!
//! ## Typestate Workflow
//!
//! ```mermaid
//! graph LR
//!     A["KcaSpec::new(q)"] -->|".with_forecast_horizon(k)"| A
//!     A -->|".with_em(EmConfig)"| A
//!     A -->|".fit(&t, &z)?"| B["KcaFit"]
//!     B --> C[".positions() / .velocities() / .accelerations()"]
//!     B --> D[".stdevs(): (n + k) x 3"]
//!     B --> E[".covariances()"]
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! StateSpace::kinematic ─▶ em::estimate ─▶ kalman::smooth ─▶ forecast ─▶ marginal_stdevs
//! ```
//!
//! Each stage is a pure function of its inputs. The stages are public so
//! callers can run the filter or smoother on a hand-built model.
//!
//! ## Quick start
//!
//! ```
//! let t = [0.0, 1.0, 2.0, 3.0];
//! let z = [0.0, 1.0, 4.0, 9.0];
//! let fit = kca_kalman::fit(&t, &z, 0.01, 2).unwrap();
//! assert_eq!(fit.len(), 6);
//! assert_eq!(fit.stdevs().shape(), &[6, 3]);
//! ```
//!
//! ## Mathematical Glossary
//!
//! | Symbol | Accessor | Meaning |
//! |--------|----------|---------|
//! | h | [`StateSpace::step()`] | grid step `(t[n-1] - t[0]) / n` |
//! | A | [`StateSpace::transition()`] | constant-acceleration transition |
//! | Q | [`StateSpace::process_covariance()`] | process noise covariance |
//! | R | [`StateSpace::observation_variance()`] | observation noise variance |
//! | mu0, P0 | [`StateSpace::initial_mean()`], [`StateSpace::initial_covariance()`] | initial-state prior |
//! | ll | [`KcaFit::log_likelihood()`] | Gaussian log-likelihood of `z` |

mod config;
mod error;
mod fit;
mod spec;
mod trajectory;

pub mod em;
pub mod forecast;
pub mod kalman;
pub(crate) mod small_linalg;
pub(crate) mod state_space;
pub mod uncertainty;

pub use config::{EmConfig, Learned, OnNonConvergence};
pub use em::{EmStatus, Estimate};
pub use error::{ErrorKind, KcaError};
pub use fit::KcaFit;
pub use forecast::forecast;
pub use kalman::{FilterPass, SmoothPass};
pub use small_linalg::{SmallMat, SmallVec, StateCovariance, StateVector};
pub use spec::{KcaSpec, checked_horizon, fit};
pub use state_space::{DEFAULT_OBSERVATION_VARIANCE, DEFAULT_PRIOR_VARIANCE, StateSpace};
pub use trajectory::Trajectory;
pub use uncertainty::marginal_stdevs;
