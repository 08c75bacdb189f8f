//! Property-based tests for the covariance invariants of kca-kalman.

use kca_kalman::{EmConfig, KcaSpec};
use proptest::prelude::*;

fn series() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::vec(-3.0f64..3.0, 5..40).prop_map(|z| {
        let t = (0..z.len()).map(|i| 0.25 * i as f64).collect();
        (t, z)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every covariance, smoothed or forecast, is symmetric PSD.
    #[test]
    fn covariances_symmetric_psd(
        (t, z) in series(),
        q in 0.001f64..1.0,
        horizon in 0usize..6,
    ) {
        let fit = KcaSpec::new(q)
            .with_forecast_horizon(horizon)
            .with_em(EmConfig::new().with_max_iter(10))
            .fit(&t, &z)
            .unwrap();

        prop_assert_eq!(fit.len(), z.len() + horizon);
        for (i, cov) in fit.covariances().iter().enumerate() {
            prop_assert_eq!(*cov, cov.transpose(), "asymmetric at {}", i);
            prop_assert!(cov.is_positive_semidefinite(), "indefinite at {}: {:?}", i, cov);
        }
    }

    /// Standard deviations are finite and non-negative.
    #[test]
    fn stdevs_finite_non_negative((t, z) in series(), q in 0.001f64..1.0) {
        let fit = KcaSpec::new(q)
            .with_forecast_horizon(3)
            .with_em(EmConfig::new().with_max_iter(0))
            .fit(&t, &z)
            .unwrap();

        prop_assert_eq!(fit.stdevs().shape(), &[z.len() + 3, 3]);
        for &sd in fit.stdevs() {
            prop_assert!(sd.is_finite() && sd >= 0.0);
        }
    }
}
