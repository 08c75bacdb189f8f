//! Per-component marginal standard deviations.

use ndarray::Array2;

use crate::small_linalg::StateCovariance;

/// Square roots of the covariance diagonals, one row per step.
///
/// Returns an `(m, 3)` array whose columns are position, velocity and
/// acceleration. Diagonal entries are clamped at zero before the square
/// root, so round-off below zero yields `0.0` rather than NaN.
///
/// # Example
///
/// ```
/// use kca_kalman::{marginal_stdevs, StateCovariance};
///
/// let covs = [StateCovariance::from_diagonal([4.0, 1.0, 0.25])];
/// let sd = marginal_stdevs(&covs);
/// assert_eq!(sd.shape(), &[1, 3]);
/// assert_eq!(sd[[0, 0]], 2.0);
/// assert_eq!(sd[[0, 2]], 0.5);
/// ```
pub fn marginal_stdevs(covs: &[StateCovariance]) -> Array2<f64> {
    let mut out = Array2::zeros((covs.len(), 3));
    for (mut row, cov) in out.rows_mut().into_iter().zip(covs) {
        for (k, cell) in row.iter_mut().enumerate() {
            *cell = cov.get(k, k).max(0.0).sqrt();
        }
    }
    out
}
