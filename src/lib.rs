//! Quickprop optimizer
//!
//! This library implements Quickprop, a secant-based alternative to
//! fixed-learning-rate gradient descent, together with the safeguards that
//! keep it numerically stable and a driver that runs it to convergence.
//!
//! # Modules
//!
//! - `optimizers`: Optimizer trait, gradient descent and the Quickprop rule
//! - `convergence`: running-mean loss tracker
//! - `driver`: seeding/iterating state machine and the `fit` entry point
//! - `provider`: GradientProvider trait and implementations
//! - `utils`: activation and loss functions for the model-backed provider
//! - `config`: hyperparameters and JSON config loading
//! - `error`: error type and result alias

pub mod config;
pub mod convergence;
pub mod driver;
pub mod error;
pub mod optimizers;
pub mod provider;
pub mod utils;

pub use config::{load_config, QuickpropConfig};
pub use convergence::ConvergenceTracker;
pub use driver::{fit, ConvergenceDriver, DriverState, IterationState, TrainingOutcome};
pub use error::{QuickpropError, Result};
pub use optimizers::{GradientDescent, Optimizer, Quickprop, QuickpropRule, StepOutcome};
pub use provider::{Evaluation, FiniteDifference, GradientProvider, LinearModel};
pub use utils::{Activation, Loss};
