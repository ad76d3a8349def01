//! Convergence driver
//!
//! Runs the Quickprop rule to convergence:
//!
//! ```text
//! Seeding ──(one gradient-descent step)──▶ Iterating ──▶ Converged
//!                                              │  ▲    ├──▶ Exhausted
//!                                              └──┘    └──▶ Cancelled
//! ```
//!
//! Iterations are strictly sequential: each one reads the delta and gradient
//! committed by the previous one. Cancellation is only observed between
//! iterations.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::config::QuickpropConfig;
use crate::convergence::ConvergenceTracker;
use crate::error::{QuickpropError, Result};
use crate::optimizers::{gradient_descent_step, QuickpropRule, StepOutcome};
use crate::provider::{GradientProvider, LinearModel};
use crate::utils::{Activation, Loss};

/// Lifecycle of a [`ConvergenceDriver`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Taking the single gradient-descent step that seeds Quickprop.
    Seeding,
    /// Applying the Quickprop rule.
    Iterating,
    /// The running-mean change dropped to the tolerance.
    Converged,
    /// The iteration budget ran out first.
    Exhausted,
    /// The caller's cancellation flag was observed between iterations.
    Cancelled,
}

impl DriverState {
    /// True for the states a run ends in.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DriverState::Converged | DriverState::Exhausted | DriverState::Cancelled
        )
    }
}

/// State carried from one iteration to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationState {
    /// Step taken in the previous iteration.
    pub previous_delta: Vec<f64>,
    /// Gradient evaluated in the previous iteration.
    pub previous_gradient: Vec<f64>,
    /// Loss evaluated in the previous iteration.
    pub previous_loss: f64,
}

impl IterationState {
    fn from_step(step: &StepOutcome) -> Self {
        Self {
            previous_delta: step.delta.clone(),
            previous_gradient: step.gradient.clone(),
            previous_loss: step.loss,
        }
    }
}

/// Result of a run, identical in shape for every terminal state.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOutcome {
    /// Parameters after the last update.
    pub parameters: Vec<f64>,
    /// Prediction from the last provider evaluation.
    pub prediction: Vec<f64>,
    /// Quickprop iterations run, excluding the seeding step.
    pub iterations: usize,
    /// Loss from the last provider evaluation.
    pub final_loss: f64,
    /// Terminal state of the run.
    pub status: DriverState,
}

impl TrainingOutcome {
    /// True if the run met the tolerance.
    pub fn converged(&self) -> bool {
        self.status == DriverState::Converged
    }
}

/// Drives a [`GradientProvider`] with the Quickprop rule until convergence,
/// patience exhaustion or cancellation.
#[derive(Debug, Clone)]
pub struct ConvergenceDriver {
    config: QuickpropConfig,
    state: DriverState,
}

impl ConvergenceDriver {
    /// Creates a driver after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`QuickpropError::InvalidConfig`] if validation fails.
    pub fn new(config: QuickpropConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: DriverState::Seeding,
        })
    }

    /// The configuration this driver runs with.
    pub fn config(&self) -> &QuickpropConfig {
        &self.config
    }

    /// State reached by the most recent run, or `Seeding` before any run.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Runs to a terminal state starting from `initial`.
    ///
    /// # Errors
    ///
    /// Provider failures and shape mismatches abort the run and are returned
    /// unchanged. Non-convergence is not an error: check
    /// [`TrainingOutcome::status`].
    pub fn run<P>(&mut self, provider: &mut P, initial: &[f64]) -> Result<TrainingOutcome>
    where
        P: GradientProvider + ?Sized,
    {
        self.run_with_cancel(provider, initial, &AtomicBool::new(false))
    }

    /// Like [`run`](Self::run), but stops with [`DriverState::Cancelled`] once
    /// `cancel` is set. The flag is checked before every Quickprop iteration.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub fn run_with_cancel<P>(
        &mut self,
        provider: &mut P,
        initial: &[f64],
        cancel: &AtomicBool,
    ) -> Result<TrainingOutcome>
    where
        P: GradientProvider + ?Sized,
    {
        if initial.is_empty() {
            return Err(QuickpropError::EmptyInput("no parameters to optimize".into()));
        }

        self.state = DriverState::Seeding;
        info!(
            parameters = initial.len(),
            learning_rate = self.config.learning_rate,
            tolerance = self.config.tolerance,
            patience = self.config.patience,
            "starting quickprop"
        );

        let seed = gradient_descent_step(provider, initial, self.config.seed_step_size)?;
        debug!(loss = seed.loss, "seeded with gradient-descent step");

        let rule = QuickpropRule::from_config(&self.config);
        let mut tracker = ConvergenceTracker::new(self.config.initial_running_mean);
        let mut iteration_state = IterationState::from_step(&seed);
        let mut parameters = seed.parameters;
        let mut prediction = seed.prediction;
        let mut final_loss = seed.loss;
        let mut iterations = 0;

        self.state = DriverState::Iterating;
        while self.state == DriverState::Iterating {
            if cancel.load(Ordering::Relaxed) {
                self.state = DriverState::Cancelled;
                break;
            }
            if iterations >= self.config.patience {
                self.state = DriverState::Exhausted;
                break;
            }

            let step = rule.step(
                provider,
                &parameters,
                &iteration_state.previous_delta,
                &iteration_state.previous_gradient,
            )?;
            iterations += 1;
            let change = tracker.record(step.loss);

            if self.config.debug && iterations % self.config.report_interval == 0 {
                info!(
                    iteration = iterations,
                    loss = step.loss,
                    running_mean = tracker.running_mean(),
                    change,
                    "quickprop progress"
                );
            }

            iteration_state = IterationState::from_step(&step);
            parameters = step.parameters;
            prediction = step.prediction;
            final_loss = step.loss;

            if change <= self.config.tolerance {
                self.state = DriverState::Converged;
            }
        }

        match self.state {
            DriverState::Converged => info!(iterations, final_loss, "quickprop converged"),
            DriverState::Exhausted => warn!(
                iterations,
                final_loss,
                running_mean = tracker.running_mean(),
                "quickprop stopped at patience limit without converging"
            ),
            _ => info!(iterations, final_loss, "quickprop cancelled"),
        }

        Ok(TrainingOutcome {
            parameters,
            prediction,
            iterations,
            final_loss,
            status: self.state,
        })
    }
}

/// Fits a single-layer model `activation(inputs · w)` to `targets` with
/// Quickprop.
///
/// `inputs` holds one row of features per sample and `initial` one parameter
/// per feature.
///
/// # Errors
///
/// Returns an error if the data set is empty or malformed, the configuration
/// is invalid, or `initial` does not match the number of features.
///
/// # Example
///
/// ```
/// use quickprop::{fit, Activation, Loss, QuickpropConfig};
///
/// // y = 2x, no bias.
/// let inputs = vec![vec![1.0], vec![2.0], vec![3.0]];
/// let targets = [2.0, 4.0, 6.0];
/// let outcome = fit(
///     &inputs,
///     &targets,
///     &[0.0],
///     Activation::Identity,
///     Loss::MeanSquaredError,
///     &QuickpropConfig::default(),
/// )
/// .unwrap();
/// assert!((outcome.parameters[0] - 2.0).abs() < 1e-3);
/// ```
pub fn fit(
    inputs: &[Vec<f64>],
    targets: &[f64],
    initial: &[f64],
    activation: Activation,
    loss: Loss,
    config: &QuickpropConfig,
) -> Result<TrainingOutcome> {
    let mut model = LinearModel::new(inputs, targets, activation, loss)?;
    let mut driver = ConvergenceDriver::new(config.clone())?;
    driver.run(&mut model, initial)
}
