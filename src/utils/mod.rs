//! Shared utilities for the model-backed gradient provider
//!
//! This module provides the activation functions and per-sample loss
//! functions used by [`crate::provider::LinearModel`].

pub mod activations;
pub mod loss;

pub use activations::Activation;
pub use loss::Loss;
