//! Tests for the convergence driver
//!
//! This file tests the driver end to end:
//! - the seeding step and the hand-off of its delta and gradient
//! - the running-mean recurrence
//! - termination within the patience budget
//! - convergence on quadratic and model-backed objectives
//! - provider failures and cancellation

use approx::assert_relative_eq;
use quickprop::optimizers::quickprop_component;
use quickprop::{
    fit, Activation, ConvergenceDriver, ConvergenceTracker, DriverState, Evaluation,
    FiniteDifference, Loss, QuickpropConfig, QuickpropError, Result,
};
use std::sync::atomic::{AtomicBool, Ordering};

// L(w) = (w - 3)^2, gradient 2(w - 3).
fn quadratic(w: &[f64]) -> Result<Evaluation> {
    let diff = w[0] - 3.0;
    Ok(Evaluation::new(diff * diff, vec![2.0 * diff]).with_prediction(vec![w[0]]))
}

// ============================================================================
// Seeding Tests
// ============================================================================

mod seeding_tests {
    use super::*;

    #[test]
    fn test_seed_step_is_scaled_gradient() {
        // Patience 1: one seed step, then exactly one Quickprop iteration.
        let mut seen = Vec::new();
        let mut provider = |w: &[f64]| -> Result<Evaluation> {
            seen.push(w.to_vec());
            quadratic(w)
        };
        let config = QuickpropConfig::default().with_patience(1);
        let mut driver = ConvergenceDriver::new(config).unwrap();
        let outcome = driver.run(&mut provider, &[0.0]).unwrap();

        let g0 = -6.0;
        let seed_delta = -1e-5 * g0;
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], vec![0.0]);
        // The first Quickprop iteration starts from the seeded parameters.
        assert_eq!(seen[1], vec![seed_delta]);

        // And it uses the seed's delta and gradient as its previous state.
        let g1 = 2.0 * (seed_delta - 3.0);
        let expected = seed_delta + quickprop_component(g1, g0, seed_delta, 1e-4, 1.75);
        assert_eq!(outcome.parameters, vec![expected]);
        assert_eq!(outcome.iterations, 1);
    }

    #[test]
    fn test_seed_step_size_configurable() {
        let mut seen = Vec::new();
        let mut provider = |w: &[f64]| -> Result<Evaluation> {
            seen.push(w[0]);
            quadratic(w)
        };
        let config = QuickpropConfig::default()
            .with_patience(1)
            .with_seed_step_size(1e-2);
        ConvergenceDriver::new(config)
            .unwrap()
            .run(&mut provider, &[0.0])
            .unwrap();

        assert_eq!(seen[1], -1e-2 * -6.0);
    }
}

// ============================================================================
// Running Mean Tests
// ============================================================================

mod running_mean_tests {
    use super::*;

    #[test]
    fn test_recurrence_matches_closed_form() {
        let losses = [9.0, 4.5, 2.0, 0.7, 0.3, 0.05, 0.01, 0.0, 0.0, 0.2];
        let mut tracker = ConvergenceTracker::new(1.0);
        let mut expected = 1.0;

        for (index, &loss) in losses.iter().enumerate() {
            let i = (index + 1) as f64;
            expected += (loss - expected) / (i + 1.0);
            tracker.record(loss);
            assert_relative_eq!(tracker.running_mean(), expected, epsilon = 1e-14);
        }
        assert_eq!(tracker.count(), losses.len());
    }

    #[test]
    fn test_custom_sentinel() {
        let mut tracker = ConvergenceTracker::new(10.0);
        tracker.record(0.0);
        assert_eq!(tracker.running_mean(), 5.0);
        assert_eq!(tracker.previous_running_mean(), 10.0);
    }

    #[test]
    fn test_constant_loss_at_sentinel_converges_immediately() {
        // Loss equal to the sentinel leaves the mean unchanged.
        let mut provider =
            |w: &[f64]| -> Result<Evaluation> { Ok(Evaluation::new(1.0, vec![w[0]])) };
        let mut driver = ConvergenceDriver::new(QuickpropConfig::default()).unwrap();
        let outcome = driver.run(&mut provider, &[0.5]).unwrap();

        assert_eq!(outcome.iterations, 1);
        assert!(outcome.converged());
    }
}

// ============================================================================
// Termination Tests
// ============================================================================

mod termination_tests {
    use super::*;

    #[test]
    fn test_iterations_never_exceed_patience() {
        for patience in [1, 2, 10, 250] {
            let config = QuickpropConfig::default()
                .with_patience(patience)
                .with_tolerance(0.0);
            let mut driver = ConvergenceDriver::new(config).unwrap();
            let mut provider = quadratic;
            let outcome = driver.run(&mut provider, &[10.0]).unwrap();

            assert!(outcome.iterations <= patience);
            assert!(driver.state().is_terminal());
        }
    }

    #[test]
    fn test_exhausted_when_running_mean_still_moving() {
        // Starting far away, the large early losses keep the running mean
        // moving past the default budget even though w reaches 3.
        let mut driver = ConvergenceDriver::new(QuickpropConfig::default()).unwrap();
        let mut provider = quadratic;
        let outcome = driver.run(&mut provider, &[10.0]).unwrap();

        assert_eq!(outcome.status, DriverState::Exhausted);
        assert_eq!(outcome.iterations, 20_000);
        assert!(!outcome.converged());
        assert_relative_eq!(outcome.parameters[0], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cancellation_observed_between_iterations() {
        let cancel = AtomicBool::new(false);
        let mut calls = 0;
        let mut provider = |w: &[f64]| -> Result<Evaluation> {
            calls += 1;
            if calls == 6 {
                cancel.store(true, Ordering::Relaxed);
            }
            quadratic(w)
        };
        let mut driver = ConvergenceDriver::new(QuickpropConfig::default()).unwrap();
        let outcome = driver
            .run_with_cancel(&mut provider, &[0.0], &cancel)
            .unwrap();

        // Seed + 5 iterations; the 5th iteration finishes before the flag is seen.
        assert_eq!(outcome.status, DriverState::Cancelled);
        assert_eq!(outcome.iterations, 5);
    }
}

// ============================================================================
// Convergence Tests
// ============================================================================

mod convergence_tests {
    use super::*;

    #[test]
    fn test_quadratic_converges_to_three() {
        let mut driver = ConvergenceDriver::new(QuickpropConfig::default()).unwrap();
        let mut provider = quadratic;
        let outcome = driver.run(&mut provider, &[0.0]).unwrap();

        assert!(outcome.converged());
        assert!(outcome.iterations <= 20_000);
        assert_relative_eq!(outcome.parameters[0], 3.0, epsilon = 1e-6);
        assert!(outcome.final_loss < 1e-12);
        assert_eq!(outcome.prediction.len(), 1);
    }

    #[test]
    fn test_finite_difference_provider_two_parameters() {
        let mut provider =
            FiniteDifference::new(|w: &[f64]| (w[0] - 1.0).powi(2) + 4.0 * (w[1] + 2.0).powi(2));
        let mut driver = ConvergenceDriver::new(QuickpropConfig::default()).unwrap();
        let outcome = driver.run(&mut provider, &[0.0, 0.0]).unwrap();

        assert_relative_eq!(outcome.parameters[0], 1.0, epsilon = 1e-4);
        assert_relative_eq!(outcome.parameters[1], -2.0, epsilon = 1e-4);
        assert!(outcome.prediction.is_empty());
    }

    #[test]
    fn test_fit_linear_regression_with_bias() {
        // y = 2x + 1; the second feature is the bias.
        let inputs: Vec<Vec<f64>> = (0..4).map(|x| vec![x as f64, 1.0]).collect();
        let targets: Vec<f64> = (0..4).map(|x| 2.0 * x as f64 + 1.0).collect();
        let outcome = fit(
            &inputs,
            &targets,
            &[0.0, 0.0],
            Activation::Identity,
            Loss::MeanSquaredError,
            &QuickpropConfig::default(),
        )
        .unwrap();

        assert_relative_eq!(outcome.parameters[0], 2.0, epsilon = 1e-4);
        assert_relative_eq!(outcome.parameters[1], 1.0, epsilon = 1e-4);
        for (prediction, target) in outcome.prediction.iter().zip(targets.iter()) {
            assert_relative_eq!(*prediction, *target, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_fit_sigmoid_learns_or() {
        let inputs = vec![
            vec![0.0, 0.0, 1.0],
            vec![0.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 1.0, 1.0],
        ];
        let targets = [0.0, 1.0, 1.0, 1.0];
        let outcome = fit(
            &inputs,
            &targets,
            &[0.0, 0.0, 0.0],
            Activation::Sigmoid,
            Loss::MeanSquaredError,
            &QuickpropConfig::default(),
        )
        .unwrap();

        assert!(outcome.prediction[0] < 0.1);
        for prediction in &outcome.prediction[1..] {
            assert!(*prediction > 0.9);
        }
    }
}

// ============================================================================
// Error Tests
// ============================================================================

mod error_tests {
    use super::*;

    #[derive(Debug)]
    struct DeviceLost;

    impl std::fmt::Display for DeviceLost {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "device lost")
        }
    }

    impl std::error::Error for DeviceLost {}

    #[test]
    fn test_provider_error_propagates_unchanged() {
        let mut provider =
            |_: &[f64]| -> Result<Evaluation> { Err(QuickpropError::provider(DeviceLost)) };
        let mut driver = ConvergenceDriver::new(QuickpropConfig::default()).unwrap();
        let err = driver.run(&mut provider, &[1.0]).unwrap_err();

        match err {
            QuickpropError::Provider(source) => assert!(source.is::<DeviceLost>()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_provider_gradient_shape_checked() {
        let mut provider =
            |_: &[f64]| -> Result<Evaluation> { Ok(Evaluation::new(1.0, vec![1.0, 2.0])) };
        let mut driver = ConvergenceDriver::new(QuickpropConfig::default()).unwrap();
        let err = driver.run(&mut provider, &[1.0]).unwrap_err();
        assert!(matches!(err, QuickpropError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_fit_rejects_wrong_initial_length() {
        let inputs = vec![vec![1.0, 1.0]];
        let err = fit(
            &inputs,
            &[1.0],
            &[0.0],
            Activation::Identity,
            Loss::MeanSquaredError,
            &QuickpropConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, QuickpropError::ShapeMismatch { .. }));
    }
}
