//! Configuration structures for Quickprop training
//!
//! This module provides the hyperparameters that drive the update rule and the
//! convergence loop, and a loader for JSON configuration files.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{QuickpropError, Result};

/// Default Quickprop step scale (`η_qp`).
pub const DEFAULT_LEARNING_RATE: f64 = 1e-4;
/// Default threshold on the change of the running mean loss.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;
/// Default iteration budget.
pub const DEFAULT_PATIENCE: usize = 20_000;
/// Default step size of the gradient-descent seeding step (`η_gd`).
pub const DEFAULT_SEED_STEP_SIZE: f64 = 1e-5;
/// Default maximum growth factor (`γ`) between consecutive deltas.
pub const DEFAULT_GROWTH_FACTOR: f64 = 1.75;
/// Default sentinel value of the running mean before the first iteration.
pub const DEFAULT_INITIAL_RUNNING_MEAN: f64 = 1.0;
/// Default number of iterations between debug progress reports.
pub const DEFAULT_REPORT_INTERVAL: usize = 100;

/// Hyperparameters for the Quickprop rule and the convergence driver.
///
/// Every field has a default, so a configuration file only needs to name the
/// values it overrides.
///
/// # Example
///
/// ```json
/// {
///   "learning_rate": 0.0001,
///   "tolerance": 1e-6,
///   "patience": 20000,
///   "debug": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickpropConfig {
    /// Quickprop step scale, used by the gradient-descent fallback and the
    /// slope-addition term.
    pub learning_rate: f64,

    /// Convergence threshold on the change of the running mean loss.
    pub tolerance: f64,

    /// Maximum number of Quickprop iterations.
    pub patience: usize,

    /// Emit a progress report every `report_interval` iterations.
    pub debug: bool,

    /// Step size of the single gradient-descent step that seeds the rule.
    pub seed_step_size: f64,

    /// Each delta is clamped to `growth_factor * |previous delta|`.
    pub growth_factor: f64,

    /// Value of the running mean before any iteration has run.
    pub initial_running_mean: f64,

    /// Iterations between progress reports when `debug` is set.
    pub report_interval: usize,
}

impl Default for QuickpropConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            tolerance: DEFAULT_TOLERANCE,
            patience: DEFAULT_PATIENCE,
            debug: false,
            seed_step_size: DEFAULT_SEED_STEP_SIZE,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            initial_running_mean: DEFAULT_INITIAL_RUNNING_MEAN,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }
}

impl QuickpropConfig {
    /// Builder: set the Quickprop step scale.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Builder: set the convergence tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Builder: set the iteration budget.
    #[must_use]
    pub fn with_patience(mut self, patience: usize) -> Self {
        self.patience = patience;
        self
    }

    /// Builder: enable or disable progress reporting.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Builder: set the seeding step size.
    #[must_use]
    pub fn with_seed_step_size(mut self, seed_step_size: f64) -> Self {
        self.seed_step_size = seed_step_size;
        self
    }

    /// Builder: set the maximum growth factor.
    #[must_use]
    pub fn with_growth_factor(mut self, growth_factor: f64) -> Self {
        self.growth_factor = growth_factor;
        self
    }

    /// Builder: set the running-mean sentinel.
    #[must_use]
    pub fn with_initial_running_mean(mut self, initial_running_mean: f64) -> Self {
        self.initial_running_mean = initial_running_mean;
        self
    }

    /// Builder: set the progress report interval.
    #[must_use]
    pub fn with_report_interval(mut self, report_interval: usize) -> Self {
        self.report_interval = report_interval;
        self
    }

    /// Checks that every hyperparameter is in its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`QuickpropError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let floats = [
            ("learning_rate", self.learning_rate),
            ("tolerance", self.tolerance),
            ("seed_step_size", self.seed_step_size),
            ("growth_factor", self.growth_factor),
            ("initial_running_mean", self.initial_running_mean),
        ];
        for (name, value) in floats {
            if !value.is_finite() {
                return Err(invalid(format!("{name} must be finite, got {value}")));
            }
        }

        if self.learning_rate <= 0.0 {
            return Err(invalid("learning_rate must be positive"));
        }
        if self.seed_step_size <= 0.0 {
            return Err(invalid("seed_step_size must be positive"));
        }
        if self.tolerance < 0.0 {
            return Err(invalid("tolerance must be non-negative"));
        }
        if self.growth_factor <= 0.0 {
            return Err(invalid("growth_factor must be positive"));
        }
        if self.patience == 0 {
            return Err(invalid("patience must be at least 1"));
        }
        if self.report_interval == 0 {
            return Err(invalid("report_interval must be at least 1"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> QuickpropError {
    QuickpropError::InvalidConfig(message.into())
}

/// Loads a Quickprop configuration from a JSON file.
///
/// Reads the file at `path`, deserializes its JSON contents into a
/// [`QuickpropConfig`] (missing fields take their defaults) and validates it.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the JSON is invalid, or a
/// value fails validation.
///
/// # Examples
///
/// ```no_run
/// use quickprop::config::load_config;
///
/// let cfg = load_config("config/quickprop.json").unwrap();
/// assert!(cfg.learning_rate > 0.0);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<QuickpropConfig> {
    let contents = fs::read_to_string(path)?;
    let config: QuickpropConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
