//! Pure-prediction extrapolation beyond the observed range.

use crate::state_space::StateSpace;
use crate::trajectory::Trajectory;

/// Extends `trajectory` by `horizon` predict-only steps.
///
/// Each step is seeded by the most recently appended entry:
/// `m' = A m`, `P' = A P Aᵀ + Q`. No observation is incorporated, so the
/// uncertainty only grows. `horizon = 0`, or an empty trajectory with no
/// state to seed from, returns the input unchanged.
pub fn forecast(mut trajectory: Trajectory, model: &StateSpace, horizon: usize) -> Trajectory {
    for _ in 0..horizon {
        let Some((mean, cov)) = trajectory.last() else {
            break;
        };
        let (mean, cov) = model.predict(mean, cov);
        trajectory.push(mean, cov);
    }
    trajectory
}
