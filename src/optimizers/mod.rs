//! Optimizer abstractions for parameter updates
//!
//! This module provides the Optimizer trait and the two update rules the
//! Quickprop driver is built from.
//!
//! # Overview
//!
//! Optimizers define how to use gradients to update model parameters. The basic
//! gradient descent update is `weight = weight - learning_rate * gradient`.
//! Quickprop instead fits a parabola through the last two gradients of every
//! parameter and jumps to its stationary point, falling back to gradient
//! descent where the parabola is undefined.
//!
//! # Available Optimizers
//!
//! - [`GradientDescent`]: fixed-step gradient descent, used to seed Quickprop
//! - [`Quickprop`]: the secant-based update with its three safeguards
//!
//! # Example
//!
//! ```
//! use quickprop::optimizers::{Optimizer, Quickprop};
//!
//! let mut optimizer = Quickprop::new(1e-4);
//! let mut weights = vec![0.0, 1.0];
//!
//! // First call seeds the rule with a small gradient-descent step.
//! optimizer.update(&mut weights, &[-6.0, 2.0]).unwrap();
//! // Later calls apply the Quickprop rule.
//! optimizer.update(&mut weights, &[-5.9, 1.9]).unwrap();
//! ```

pub mod quickprop;
pub mod sgd;

pub use quickprop::{quickprop_component, quickprop_delta, Quickprop, QuickpropRule};
pub use sgd::{gradient_descent_step, GradientDescent};

use crate::error::Result;

/// Core trait for parameter optimizers.
///
/// All optimizer types implement this trait to provide a uniform interface for
/// parameter updates in a caller-owned training loop.
///
/// # State Management
///
/// Quickprop keeps the previous delta and previous gradient of every parameter
/// between updates. The optimizer manages this state internally, so callers
/// only need to provide parameters and gradients.
pub trait Optimizer {
    /// Update parameters in place using gradients.
    ///
    /// Returns the delta that was added to each parameter.
    ///
    /// # Errors
    ///
    /// Returns [`crate::QuickpropError::ShapeMismatch`] if `parameters` and
    /// `gradients` (or any stored per-parameter state) differ in length. The
    /// parameters are left untouched in that case.
    fn update(&mut self, parameters: &mut [f64], gradients: &[f64]) -> Result<Vec<f64>>;

    /// Reset optimizer state.
    ///
    /// For stateless optimizers like gradient descent, this is a no-op.
    fn reset(&mut self);

    /// Get the learning rate for this optimizer.
    fn learning_rate(&self) -> f64;

    /// Set the learning rate for this optimizer.
    fn set_learning_rate(&mut self, lr: f64);
}

/// Result of one provider evaluation followed by one update.
///
/// `loss`, `gradient` and `prediction` describe the parameters *before* the
/// update; `parameters` is the updated vector and `delta` the step taken.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// `old parameters + delta`.
    pub parameters: Vec<f64>,
    /// The step that was applied.
    pub delta: Vec<f64>,
    /// Loss at the old parameters.
    pub loss: f64,
    /// Gradient at the old parameters.
    pub gradient: Vec<f64>,
    /// Model prediction at the old parameters.
    pub prediction: Vec<f64>,
}

pub(crate) fn apply_delta(parameters: &[f64], delta: &[f64]) -> Vec<f64> {
    parameters
        .iter()
        .zip(delta.iter())
        .map(|(w, d)| w + d)
        .collect()
}
