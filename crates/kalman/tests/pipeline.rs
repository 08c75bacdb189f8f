//! End-to-end tests for kca-kalman.

use approx::assert_abs_diff_eq;
use kca_kalman::{EmConfig, ErrorKind, KcaError, KcaSpec, checked_horizon, fit};
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

fn grid(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

/// Noisy sine sampled on `[0, 5π]`, the shape of a standardized price path.
fn noisy_sine(n: usize, sd: f64, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, sd).unwrap();
    let span = 5.0 * std::f64::consts::PI;
    let t: Vec<f64> = (0..n).map(|i| span * i as f64 / (n - 1) as f64).collect();
    let z: Vec<f64> = t.iter().map(|x| x.sin() + normal.sample(&mut rng)).collect();
    (t, z)
}

#[test]
fn quadratic_series_accelerates() {
    let fit = fit(&grid(4), &[0.0, 1.0, 4.0, 9.0], 0.01, 2).unwrap();
    assert_eq!(fit.len(), 6);

    let acc = fit.accelerations();
    assert!(acc[3] > 0.0, "smoothed acceleration {acc:?}");

    let pos = fit.positions();
    // forecast continues the convex increasing trend
    assert!(pos[4] > pos[3]);
    assert!(pos[5] > pos[4]);
    assert!(pos[5] - pos[4] > pos[4] - pos[3]);
}

#[test]
fn constant_series_has_no_motion() {
    let fit = fit(&grid(5), &[5.0; 5], 0.1, 0).unwrap();
    assert_eq!(fit.len(), 5);
    for (i, m) in fit.means().iter().enumerate() {
        assert_abs_diff_eq!(m.get(0), 5.0, epsilon = 1e-6);
        assert!(m.get(1).abs() < 1e-6, "velocity at {i}: {}", m.get(1));
        assert!(m.get(2).abs() < 1e-6, "acceleration at {i}: {}", m.get(2));
    }
}

#[test]
fn output_length_is_n_plus_horizon() {
    let (t, z) = noisy_sine(50, 0.2, 7);
    for horizon in [0, 1, 10] {
        let fit = fit(&t, &z, 0.1, horizon).unwrap();
        assert_eq!(fit.len(), 50 + horizon);
        assert_eq!(fit.covariances().len(), 50 + horizon);
        assert_eq!(fit.stdevs().nrows(), 50 + horizon);
    }
}

#[test]
fn forecast_uncertainty_grows() {
    let (t, z) = noisy_sine(80, 0.1, 11);
    let fit = fit(&t, &z, 0.05, 15).unwrap();
    let covs = &fit.covariances()[fit.n_observed() - 1..];
    for w in covs.windows(2) {
        assert!(
            w[1].trace() >= w[0].trace(),
            "trace fell from {} to {}",
            w[0].trace(),
            w[1].trace()
        );
    }
    let sd = fit.stdevs();
    let last = fit.len() - 1;
    assert!(sd[[last, 0]] > sd[[fit.n_observed() - 1, 0]]);
}

#[test]
fn identical_inputs_identical_outputs() {
    let (t, z) = noisy_sine(60, 0.3, 3);
    let a = fit(&t, &z, 0.2, 5).unwrap();
    let b = fit(&t, &z, 0.2, 5).unwrap();
    assert_eq!(a.means(), b.means());
    assert_eq!(a.covariances(), b.covariances());
    assert_eq!(a.stdevs(), b.stdevs());
    assert_eq!(a.log_likelihood(), b.log_likelihood());
}

#[test]
fn smoothing_beats_raw_observations() {
    let (t, z) = noisy_sine(200, 0.2, 5);
    let fit = fit(&t, &z, 0.1, 0).unwrap();
    let rmse = |xs: &[f64]| {
        (xs.iter()
            .zip(&t)
            .map(|(p, x)| (p - x.sin()).powi(2))
            .sum::<f64>()
            / t.len() as f64)
            .sqrt()
    };
    let smoothed = rmse(&fit.positions());
    let raw = rmse(&z);
    assert!(smoothed < raw, "smoothed rmse {smoothed} >= raw rmse {raw}");
}

#[test]
fn invalid_inputs_are_invalid_input_kind() {
    let cases: Vec<KcaError> = vec![
        fit(&[0.0], &[1.0], 0.1, 0).unwrap_err(),
        fit(&grid(3), &[1.0, 2.0], 0.1, 0).unwrap_err(),
        fit(&grid(3), &[1.0, 2.0, 3.0], -0.5, 0).unwrap_err(),
        fit(&[0.0, 2.0, 1.0], &[1.0, 2.0, 3.0], 0.1, 0).unwrap_err(),
        checked_horizon(-1).unwrap_err(),
    ];
    for err in cases {
        assert_eq!(err.kind(), ErrorKind::InvalidInput, "{err}");
    }
}

#[test]
fn hard_fail_policy_surfaces_non_convergence() {
    let (t, z) = noisy_sine(40, 0.3, 9);
    let err = KcaSpec::new(0.1)
        .with_em(
            EmConfig::new()
                .with_max_iter(1)
                .with_tolerance(0.0)
                .with_on_non_convergence(kca_kalman::OnNonConvergence::Fail),
        )
        .fit(&t, &z)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NonConvergence);
}

#[test]
fn em_improves_on_seed_likelihood() {
    let (t, z) = noisy_sine(100, 0.2, 13);
    let seed_only = KcaSpec::new(0.1)
        .with_em(EmConfig::new().with_max_iter(0))
        .fit(&t, &z)
        .unwrap();
    let learned = KcaSpec::new(0.1).fit(&t, &z).unwrap();
    assert!(learned.log_likelihood() >= seed_only.log_likelihood());
}
