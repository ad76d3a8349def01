//! Activation functions for single-layer models
//!
//! Each activation exposes its value and its derivative with respect to the
//! pre-activation, which is what the chain rule in
//! [`crate::provider::LinearModel`] needs.

use serde::{Deserialize, Serialize};

/// Sigmoid activation function.
///
/// Returns the sigmoid of the input: 1 / (1 + exp(-x))
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid derivative assuming s = sigmoid(z).
///
/// Returns the derivative: s * (1 - s)
pub fn sigmoid_derivative(s: f64) -> f64 {
    s * (1.0 - s)
}

/// Elementwise activation applied to the model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// `f(z) = z`
    #[default]
    Identity,
    /// `f(z) = 1 / (1 + e^-z)`
    Sigmoid,
    /// `f(z) = tanh(z)`
    Tanh,
    /// `f(z) = max(z, 0)`
    Relu,
}

impl Activation {
    /// Applies the activation to a pre-activation value.
    pub fn apply(self, z: f64) -> f64 {
        match self {
            Activation::Identity => z,
            Activation::Sigmoid => sigmoid(z),
            Activation::Tanh => z.tanh(),
            Activation::Relu => z.max(0.0),
        }
    }

    /// Derivative with respect to the pre-activation `z`.
    ///
    /// ReLU uses 0 as its subgradient at `z = 0`.
    pub fn derivative(self, z: f64) -> f64 {
        match self {
            Activation::Identity => 1.0,
            Activation::Sigmoid => sigmoid_derivative(sigmoid(z)),
            Activation::Tanh => {
                let t = z.tanh();
                1.0 - t * t
            }
            Activation::Relu => {
                if z > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}
