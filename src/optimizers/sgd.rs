//! Fixed-step gradient descent
//!
//! This module provides the plain gradient descent update
//! `parameter = parameter - step_size * gradient`, both as an [`Optimizer`]
//! and as the provider-driven step that seeds Quickprop.

use crate::error::{check_len, Result};
use crate::optimizers::{apply_delta, Optimizer, StepOutcome};
use crate::provider::GradientProvider;

/// Gradient descent optimizer.
///
/// Implements the basic gradient descent update rule without momentum or
/// adaptive learning rates:
///
/// `Δw = -η * ∇L/∂w`, `w' = w + Δw`
///
/// # Example
///
/// ```
/// use quickprop::optimizers::{GradientDescent, Optimizer};
///
/// let mut optimizer = GradientDescent::new(0.1);
/// let mut weights = vec![1.0, 2.0, 3.0];
///
/// let delta = optimizer.update(&mut weights, &[0.1, 0.2, 0.3]).unwrap();
/// assert!((weights[0] - 0.99).abs() < 1e-12);
/// assert!((delta[2] - -0.03).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct GradientDescent {
    learning_rate: f64,
}

impl GradientDescent {
    /// Creates a new gradient descent optimizer with the given step size.
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }

    /// The delta `-η * g` for every gradient component.
    pub fn delta(&self, gradients: &[f64]) -> Vec<f64> {
        gradients.iter().map(|g| -self.learning_rate * g).collect()
    }
}

impl Optimizer for GradientDescent {
    fn update(&mut self, parameters: &mut [f64], gradients: &[f64]) -> Result<Vec<f64>> {
        check_len("gradients", parameters.len(), gradients.len())?;

        let delta = self.delta(gradients);
        for (param, d) in parameters.iter_mut().zip(delta.iter()) {
            *param += d;
        }
        Ok(delta)
    }

    fn reset(&mut self) {
        // Gradient descent has no state to reset
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.learning_rate = lr;
    }
}

/// Evaluates `provider` once at `parameters` and takes one gradient-descent
/// step of size `step_size`.
///
/// Quickprop is undefined without a previous delta and a previous gradient;
/// the outcome of this step supplies both.
///
/// # Errors
///
/// Propagates provider failures unchanged, and returns
/// [`crate::QuickpropError::ShapeMismatch`] if the provider's gradient does not
/// match `parameters` in length.
pub fn gradient_descent_step<P>(
    provider: &mut P,
    parameters: &[f64],
    step_size: f64,
) -> Result<StepOutcome>
where
    P: GradientProvider + ?Sized,
{
    let evaluation = provider.evaluate(parameters)?;
    check_len("gradient", parameters.len(), evaluation.gradient.len())?;

    let delta = GradientDescent::new(step_size).delta(&evaluation.gradient);
    Ok(StepOutcome {
        parameters: apply_delta(parameters, &delta),
        delta,
        loss: evaluation.loss,
        gradient: evaluation.gradient,
        prediction: evaluation.prediction,
    })
}
