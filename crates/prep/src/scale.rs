//! Zero-mean, unit-variance standardization.

use crate::error::PrepError;

/// Location and scale learned from a series.
///
/// The scale is the population standard deviation. A scale below
/// `10 * f64::EPSILON` is replaced by `1.0`, so a constant series is only
/// centred.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Standardizer {
    mean: f64,
    scale: f64,
}

impl Standardizer {
    /// Learns mean and scale from `x`.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InsufficientData`] for an empty series and
    /// [`PrepError::NonFinite`] if any value is NaN or infinite.
    pub fn fit(x: &[f64]) -> Result<Self, PrepError> {
        if x.is_empty() {
            return Err(PrepError::InsufficientData { n: 0, min: 1 });
        }
        if let Some(index) = x.iter().position(|v| !v.is_finite()) {
            return Err(PrepError::NonFinite { index });
        }
        let n = x.len() as f64;
        let mean = x.iter().sum::<f64>() / n;
        let var = x.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        let sd = var.sqrt();
        let scale = if sd < 10.0 * f64::EPSILON { 1.0 } else { sd };
        Ok(Self { mean, scale })
    }

    /// Learned mean.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Learned scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Maps values into standardized units.
    pub fn transform(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|v| (v - self.mean) / self.scale).collect()
    }

    /// Maps standardized values back to price units.
    pub fn inverse(&self, z: &[f64]) -> Vec<f64> {
        z.iter().map(|v| v * self.scale + self.mean).collect()
    }
}
