//! Quickprop update rule
//!
//! Quickprop models the loss around each parameter as an upward-opening
//! parabola whose curvature is estimated from the secant of the last two
//! gradients, and steps to the parabola's stationary point:
//!
//! ```text
//! Δw_n = Δw_{n-1} * g_n / (g_{n-1} - g_n)
//! ```
//!
//! Three safeguards are applied to every component, in this order:
//!
//! 1. where `g_{n-1} == g_n` the parabola is undefined and the component
//!    falls back to gradient descent, `-η * g_n`
//! 2. if the raw step keeps the direction of the previous step, `-η * g_n`
//!    is added to it; a reversal is never amplified
//! 3. the result is clamped to `±γ * |Δw_{n-1}|`
//!
//! Components never interact: every operation here is elementwise.
//!
//! # Reference
//!
//! Fahlman, S. E. (1988). An empirical study of learning speed in
//! back-propagation networks. CMU-CS-88-162.

use crate::config::{QuickpropConfig, DEFAULT_GROWTH_FACTOR, DEFAULT_SEED_STEP_SIZE};
use crate::error::{check_len, Result};
use crate::optimizers::{apply_delta, GradientDescent, Optimizer, StepOutcome};
use crate::provider::GradientProvider;

/// Sign with zero as its own bucket. `f64::signum` maps `±0.0` to `±1.0`,
/// which would make a zero step agree with every direction.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Computes one component of the Quickprop delta.
///
/// # Arguments
///
/// * `gradient` - current gradient component `g_n`
/// * `previous_gradient` - gradient component of the previous iteration `g_{n-1}`
/// * `previous_delta` - step taken by this component in the previous iteration
/// * `learning_rate` - `η`, scale of the gradient-descent fallback and slope term
/// * `growth_factor` - `γ`, bound on `|Δw_n| / |Δw_{n-1}|`
///
/// # Examples
///
/// ```
/// use quickprop::optimizers::quickprop_component;
///
/// // Equal gradients: no secant, plain gradient descent (plus slope term).
/// let delta = quickprop_component(2.0, 2.0, -1.0, 0.1, 1.75);
/// assert!((delta - -0.4).abs() < 1e-12);
/// ```
pub fn quickprop_component(
    gradient: f64,
    previous_gradient: f64,
    previous_delta: f64,
    learning_rate: f64,
    growth_factor: f64,
) -> f64 {
    // 1. Blend Quickprop and gradient descent with a hard 0/1 selector. A zero
    //    denominator is replaced by 1.0 before dividing; its quotient is
    //    multiplied by zero anyway.
    let denom = previous_gradient - gradient;
    let select = if denom.abs() > 0.0 { 1.0 } else { 0.0 };
    let safe_denom = denom + (1.0 - select);
    let quickprop_term = select * (previous_delta / safe_denom);
    let descent_term = (1.0 - select) * -learning_rate;
    let raw = gradient * (quickprop_term + descent_term);

    // 2. Conditional slope addition.
    let agree = (sign(raw) + sign(previous_delta)).abs().min(1.0);
    let delta = raw + agree * (-learning_rate * gradient);

    // 3. Maximum growth clamp. `f64::clamp` panics on a NaN bound.
    let max_growth = growth_factor * previous_delta.abs();
    delta.max(-max_growth).min(max_growth)
}

/// Computes the Quickprop delta for every component.
///
/// # Errors
///
/// Returns [`crate::QuickpropError::ShapeMismatch`] if the three vectors differ
/// in length.
pub fn quickprop_delta(
    gradients: &[f64],
    previous_gradients: &[f64],
    previous_deltas: &[f64],
    learning_rate: f64,
    growth_factor: f64,
) -> Result<Vec<f64>> {
    check_len("previous gradient", gradients.len(), previous_gradients.len())?;
    check_len("previous delta", gradients.len(), previous_deltas.len())?;

    Ok(gradients
        .iter()
        .zip(previous_gradients.iter())
        .zip(previous_deltas.iter())
        .map(|((&g, &g_prev), &d_prev)| {
            quickprop_component(g, g_prev, d_prev, learning_rate, growth_factor)
        })
        .collect())
}

/// Hyperparameters of the Quickprop rule, detached from any state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuickpropRule {
    /// `η`: gradient-descent fallback and slope-addition scale.
    pub learning_rate: f64,
    /// `γ`: maximum growth between consecutive deltas.
    pub growth_factor: f64,
}

impl QuickpropRule {
    /// Creates a rule with the default growth factor of 1.75.
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            growth_factor: DEFAULT_GROWTH_FACTOR,
        }
    }

    /// Takes the rule's hyperparameters from a configuration.
    pub fn from_config(config: &QuickpropConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            growth_factor: config.growth_factor,
        }
    }

    /// See [`quickprop_delta`].
    pub fn delta(
        &self,
        gradients: &[f64],
        previous_gradients: &[f64],
        previous_deltas: &[f64],
    ) -> Result<Vec<f64>> {
        quickprop_delta(
            gradients,
            previous_gradients,
            previous_deltas,
            self.learning_rate,
            self.growth_factor,
        )
    }

    /// Evaluates `provider` at `parameters` and takes one Quickprop step
    /// against the previous iteration's delta and gradient.
    ///
    /// # Errors
    ///
    /// Shapes are checked before the provider is called. Provider failures are
    /// propagated unchanged.
    pub fn step<P>(
        &self,
        provider: &mut P,
        parameters: &[f64],
        previous_delta: &[f64],
        previous_gradient: &[f64],
    ) -> Result<StepOutcome>
    where
        P: GradientProvider + ?Sized,
    {
        check_len("previous delta", parameters.len(), previous_delta.len())?;
        check_len("previous gradient", parameters.len(), previous_gradient.len())?;

        let evaluation = provider.evaluate(parameters)?;
        check_len("gradient", parameters.len(), evaluation.gradient.len())?;

        let delta = self.delta(&evaluation.gradient, previous_gradient, previous_delta)?;
        Ok(StepOutcome {
            parameters: apply_delta(parameters, &delta),
            delta,
            loss: evaluation.loss,
            gradient: evaluation.gradient,
            prediction: evaluation.prediction,
        })
    }
}

/// Quickprop as a stateful [`Optimizer`].
///
/// The first update after construction or [`Optimizer::reset`] is a
/// gradient-descent step of size `seed_step_size`; it records the delta and
/// gradient that every later Quickprop update needs.
///
/// # Example
///
/// ```
/// use quickprop::optimizers::{Optimizer, Quickprop};
///
/// // Minimize (w - 3)^2.
/// let mut optimizer = Quickprop::new(1e-4);
/// let mut w = vec![0.0];
/// for _ in 0..100 {
///     let grad = vec![2.0 * (w[0] - 3.0)];
///     optimizer.update(&mut w, &grad).unwrap();
/// }
/// assert!((w[0] - 3.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct Quickprop {
    rule: QuickpropRule,
    seed_step_size: f64,
    /// Step taken by each parameter in the previous update. Empty until seeded.
    previous_delta: Vec<f64>,
    /// Gradient seen by each parameter in the previous update.
    previous_gradient: Vec<f64>,
}

impl Quickprop {
    /// Creates an unseeded optimizer with default growth factor and seed step.
    pub fn new(learning_rate: f64) -> Self {
        Self {
            rule: QuickpropRule::new(learning_rate),
            seed_step_size: DEFAULT_SEED_STEP_SIZE,
            previous_delta: Vec::new(),
            previous_gradient: Vec::new(),
        }
    }

    /// Creates an unseeded optimizer from a configuration.
    pub fn from_config(config: &QuickpropConfig) -> Self {
        Self {
            rule: QuickpropRule::from_config(config),
            seed_step_size: config.seed_step_size,
            previous_delta: Vec::new(),
            previous_gradient: Vec::new(),
        }
    }

    /// Builder: set the maximum growth factor.
    #[must_use]
    pub fn with_growth_factor(mut self, growth_factor: f64) -> Self {
        self.rule.growth_factor = growth_factor;
        self
    }

    /// Builder: set the step size of the seeding gradient-descent update.
    #[must_use]
    pub fn with_seed_step_size(mut self, seed_step_size: f64) -> Self {
        self.seed_step_size = seed_step_size;
        self
    }

    /// The stateless rule this optimizer applies.
    pub fn rule(&self) -> QuickpropRule {
        self.rule
    }

    /// Whether the seeding step has run.
    pub fn is_seeded(&self) -> bool {
        !self.previous_delta.is_empty()
    }

    /// Delta applied by the last update.
    pub fn previous_delta(&self) -> &[f64] {
        &self.previous_delta
    }

    /// Gradient passed to the last update.
    pub fn previous_gradient(&self) -> &[f64] {
        &self.previous_gradient
    }
}

impl Optimizer for Quickprop {
    fn update(&mut self, parameters: &mut [f64], gradients: &[f64]) -> Result<Vec<f64>> {
        check_len("gradients", parameters.len(), gradients.len())?;

        let delta = if self.is_seeded() {
            self.rule
                .delta(gradients, &self.previous_gradient, &self.previous_delta)?
        } else {
            GradientDescent::new(self.seed_step_size).delta(gradients)
        };

        for (param, d) in parameters.iter_mut().zip(delta.iter()) {
            *param += d;
        }
        self.previous_gradient = gradients.to_vec();
        self.previous_delta = delta.clone();
        Ok(delta)
    }

    fn reset(&mut self) {
        self.previous_delta.clear();
        self.previous_gradient.clear();
    }

    fn learning_rate(&self) -> f64 {
        self.rule.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.rule.learning_rate = lr;
    }
}
