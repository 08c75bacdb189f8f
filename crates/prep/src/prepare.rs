//! One-call preparation of a price series.

use tracing::debug;

use crate::error::PrepError;
use crate::grid::time_grid;
use crate::scale::Standardizer;

/// A series ready for fitting.
#[derive(Clone, Debug, PartialEq)]
pub struct Prepared {
    /// Time grid on `[0, span]`.
    pub t: Vec<f64>,
    /// Standardized observations, aligned with `t`.
    pub z: Vec<f64>,
    /// Scaler that produced `z`.
    pub scaler: Standardizer,
}

/// Builds the time grid and standardized observations for `closes`.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`PrepError::InsufficientData`] | fewer than two closes |
/// | [`PrepError::InvalidSpan`] | `span` not finite or `<= 0` |
/// | [`PrepError::NonFinite`] | a close is NaN or infinite |
pub fn prepare(closes: &[f64], span: f64) -> Result<Prepared, PrepError> {
    let t = time_grid(closes.len(), span)?;
    let scaler = Standardizer::fit(closes)?;
    let z = scaler.transform(closes);
    debug!(
        n = closes.len(),
        mean = scaler.mean(),
        scale = scaler.scale(),
        "prepared series"
    );
    Ok(Prepared { t, z, scaler })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::DEFAULT_TIME_SPAN;

    #[test]
    fn aligned_lengths() {
        let p = prepare(&[100.0, 101.0, 99.5, 102.0], DEFAULT_TIME_SPAN).unwrap();
        assert_eq!(p.t.len(), 4);
        assert_eq!(p.z.len(), 4);
        assert_eq!(p.t[3], DEFAULT_TIME_SPAN);
    }

    #[test]
    fn single_close_rejected() {
        assert_eq!(
            prepare(&[100.0], DEFAULT_TIME_SPAN).unwrap_err(),
            PrepError::InsufficientData { n: 1, min: 2 }
        );
    }

    #[test]
    fn non_finite_close_rejected() {
        assert_eq!(
            prepare(&[1.0, f64::INFINITY, 2.0], 1.0).unwrap_err(),
            PrepError::NonFinite { index: 1 }
        );
    }
}
