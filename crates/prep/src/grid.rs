//! Evenly spaced time grids.

use crate::error::PrepError;

/// Default grid span, `5π`.
pub const DEFAULT_TIME_SPAN: f64 = 5.0 * std::f64::consts::PI;

/// `n` evenly spaced points on `[0, span]`, both ends included.
///
/// The last point is pinned to `span` exactly.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`PrepError::InsufficientData`] | `n < 2` |
/// | [`PrepError::InvalidSpan`] | `span` not finite or `<= 0` |
///
/// # Example
///
/// ```
/// use kca_prep::time_grid;
///
/// let t = time_grid(5, 2.0).unwrap();
/// assert_eq!(t, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
/// ```
pub fn time_grid(n: usize, span: f64) -> Result<Vec<f64>, PrepError> {
    if n < 2 {
        return Err(PrepError::InsufficientData { n, min: 2 });
    }
    if !span.is_finite() || span <= 0.0 {
        return Err(PrepError::InvalidSpan { span });
    }
    let step = span / (n - 1) as f64;
    let mut t: Vec<f64> = (0..n).map(|i| i as f64 * step).collect();
    t[n - 1] = span;
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn endpoints_and_monotone() {
        let t = time_grid(101, DEFAULT_TIME_SPAN).unwrap();
        assert_eq!(t.len(), 101);
        assert_eq!(t[0], 0.0);
        assert_eq!(t[100], DEFAULT_TIME_SPAN);
        assert!(t.windows(2).all(|w| w[1] > w[0]));
        assert_abs_diff_eq!(t[50], DEFAULT_TIME_SPAN / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn two_points() {
        assert_eq!(time_grid(2, 3.0).unwrap(), vec![0.0, 3.0]);
    }

    #[test]
    fn rejects_short() {
        assert_eq!(
            time_grid(1, 1.0).unwrap_err(),
            PrepError::InsufficientData { n: 1, min: 2 }
        );
        assert!(time_grid(0, 1.0).is_err());
    }

    #[test]
    fn rejects_bad_span() {
        assert!(matches!(time_grid(3, 0.0), Err(PrepError::InvalidSpan { .. })));
        assert!(matches!(time_grid(3, -2.0), Err(PrepError::InvalidSpan { .. })));
        assert!(matches!(time_grid(3, f64::NAN), Err(PrepError::InvalidSpan { .. })));
    }
}
