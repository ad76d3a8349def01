//! Gradient providers
//!
//! The Quickprop core never differentiates anything itself. It asks a
//! [`GradientProvider`] for the loss, gradient and prediction at a parameter
//! vector. Any implementation satisfying the contract is interchangeable:
//!
//! - a closure returning an [`Evaluation`]
//! - [`FiniteDifference`]: central differences over a scalar loss
//! - [`LinearModel`]: a single-layer model `activation(X · w)` with an
//!   analytically derived gradient

use crate::error::{check_len, QuickpropError, Result};
use crate::utils::{Activation, Loss};

/// Loss, gradient and prediction at one parameter vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Scalar loss.
    pub loss: f64,
    /// Gradient of the loss, same length as the parameter vector.
    pub gradient: Vec<f64>,
    /// Model output. Empty for providers that have no notion of prediction.
    pub prediction: Vec<f64>,
}

impl Evaluation {
    /// Builds an evaluation without a prediction.
    pub fn new(loss: f64, gradient: Vec<f64>) -> Self {
        Self {
            loss,
            gradient,
            prediction: Vec::new(),
        }
    }

    /// Attaches a prediction vector.
    #[must_use]
    pub fn with_prediction(mut self, prediction: Vec<f64>) -> Self {
        self.prediction = prediction;
        self
    }
}

/// Supplies loss and gradient for a parameter vector.
///
/// Implementations must be deterministic for identical parameters. A failure
/// is fatal to the caller: the driver does not retry.
pub trait GradientProvider {
    /// Evaluates the objective at `parameters`.
    ///
    /// # Errors
    ///
    /// Any error is propagated unchanged to the caller of the driver.
    fn evaluate(&mut self, parameters: &[f64]) -> Result<Evaluation>;
}

impl<F> GradientProvider for F
where
    F: FnMut(&[f64]) -> Result<Evaluation>,
{
    fn evaluate(&mut self, parameters: &[f64]) -> Result<Evaluation> {
        self(parameters)
    }
}

/// Default step of [`FiniteDifference`].
pub const DEFAULT_FINITE_DIFFERENCE_STEP: f64 = 1e-6;

/// Approximates the gradient of a scalar loss by central differences.
///
/// Each evaluation calls the loss `2n + 1` times for `n` parameters.
pub struct FiniteDifference<F> {
    loss_fn: F,
    step: f64,
}

impl<F> FiniteDifference<F>
where
    F: FnMut(&[f64]) -> f64,
{
    /// Wraps `loss_fn` with the default step of `1e-6`.
    pub fn new(loss_fn: F) -> Self {
        Self {
            loss_fn,
            step: DEFAULT_FINITE_DIFFERENCE_STEP,
        }
    }

    /// Builder: set the difference step.
    #[must_use]
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }
}

impl<F> GradientProvider for FiniteDifference<F>
where
    F: FnMut(&[f64]) -> f64,
{
    fn evaluate(&mut self, parameters: &[f64]) -> Result<Evaluation> {
        let loss = (self.loss_fn)(parameters);
        let mut probe = parameters.to_vec();
        let mut gradient = Vec::with_capacity(parameters.len());

        for i in 0..parameters.len() {
            let original = probe[i];
            probe[i] = original + self.step;
            let plus = (self.loss_fn)(&probe);
            probe[i] = original - self.step;
            let minus = (self.loss_fn)(&probe);
            probe[i] = original;
            gradient.push((plus - minus) / (2.0 * self.step));
        }

        Ok(Evaluation::new(loss, gradient))
    }
}

/// Single-layer model `prediction_k = activation(Σ_j x_kj · w_j)` over a fixed
/// data set.
///
/// The loss is the mean of the per-sample loss; the gradient follows from the
/// chain rule. There is no implicit bias term: append a constant `1.0` feature
/// to every sample to learn one.
#[derive(Debug, Clone)]
pub struct LinearModel {
    /// Row-major `num_samples × num_features`.
    inputs: Vec<f64>,
    targets: Vec<f64>,
    num_features: usize,
    activation: Activation,
    loss: Loss,
}

impl LinearModel {
    /// Builds the model from one row of features per sample.
    ///
    /// # Errors
    ///
    /// - [`QuickpropError::EmptyInput`] if there are no samples or no features
    /// - [`QuickpropError::ShapeMismatch`] if rows differ in length or the
    ///   number of targets differs from the number of samples
    pub fn new(
        inputs: &[Vec<f64>],
        targets: &[f64],
        activation: Activation,
        loss: Loss,
    ) -> Result<Self> {
        let first = inputs
            .first()
            .ok_or_else(|| QuickpropError::EmptyInput("no input samples".into()))?;
        let num_features = first.len();
        if num_features == 0 {
            return Err(QuickpropError::EmptyInput("input samples have no features".into()));
        }
        check_len("targets", inputs.len(), targets.len())?;

        let mut flat = Vec::with_capacity(inputs.len() * num_features);
        for row in inputs {
            check_len("input row", num_features, row.len())?;
            flat.extend_from_slice(row);
        }

        Ok(Self {
            inputs: flat,
            targets: targets.to_vec(),
            num_features,
            activation,
            loss,
        })
    }

    /// Number of samples.
    pub fn num_samples(&self) -> usize {
        self.targets.len()
    }

    /// Number of features, which is also the number of parameters.
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Model output for every sample.
    ///
    /// # Errors
    ///
    /// Returns [`QuickpropError::ShapeMismatch`] if `parameters` does not have
    /// one entry per feature.
    pub fn predict(&self, parameters: &[f64]) -> Result<Vec<f64>> {
        check_len("parameters", self.num_features, parameters.len())?;
        Ok(self
            .pre_activations(parameters)
            .map(|z| self.activation.apply(z))
            .collect())
    }

    fn pre_activations<'a>(&'a self, parameters: &'a [f64]) -> impl Iterator<Item = f64> + 'a {
        self.inputs
            .chunks_exact(self.num_features)
            .map(move |row| row.iter().zip(parameters).map(|(x, w)| x * w).sum::<f64>())
    }
}

impl GradientProvider for LinearModel {
    fn evaluate(&mut self, parameters: &[f64]) -> Result<Evaluation> {
        check_len("parameters", self.num_features, parameters.len())?;

        let scale = 1.0 / self.num_samples() as f64;
        let mut total_loss = 0.0;
        let mut gradient = vec![0.0; self.num_features];
        let mut prediction = Vec::with_capacity(self.num_samples());

        let rows = self.inputs.chunks_exact(self.num_features);
        for ((row, z), &target) in rows
            .zip(self.pre_activations(parameters))
            .zip(self.targets.iter())
        {
            let output = self.activation.apply(z);
            total_loss += self.loss.value(output, target);

            // dL/dz for this sample, already divided by the sample count.
            let dz = scale * self.loss.derivative(output, target) * self.activation.derivative(z);
            for (g, x) in gradient.iter_mut().zip(row) {
                *g += dz * x;
            }
            prediction.push(output);
        }

        Ok(Evaluation {
            loss: total_loss * scale,
            gradient,
            prediction,
        })
    }
}
