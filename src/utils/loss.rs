//! Per-sample loss functions
//!
//! The model provider averages `value` over samples and uses `derivative`
//! (with respect to the prediction) in its chain rule.

use serde::{Deserialize, Serialize};

/// Predictions are clipped to `[PROB_EPSILON, 1 - PROB_EPSILON]` before the
/// cross-entropy logarithms.
const PROB_EPSILON: f64 = 1e-12;

/// Per-sample loss between a prediction and its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    /// `(p - t)^2`
    #[default]
    MeanSquaredError,
    /// `|p - t|`
    MeanAbsoluteError,
    /// `-(t ln p + (1 - t) ln(1 - p))`
    BinaryCrossEntropy,
}

impl Loss {
    /// Loss of a single prediction.
    pub fn value(self, prediction: f64, target: f64) -> f64 {
        match self {
            Loss::MeanSquaredError => {
                let diff = prediction - target;
                diff * diff
            }
            Loss::MeanAbsoluteError => (prediction - target).abs(),
            Loss::BinaryCrossEntropy => {
                let p = prediction.clamp(PROB_EPSILON, 1.0 - PROB_EPSILON);
                -(target * p.ln() + (1.0 - target) * (1.0 - p).ln())
            }
        }
    }

    /// Derivative of [`Loss::value`] with respect to the prediction.
    pub fn derivative(self, prediction: f64, target: f64) -> f64 {
        match self {
            Loss::MeanSquaredError => 2.0 * (prediction - target),
            Loss::MeanAbsoluteError => {
                let diff = prediction - target;
                if diff > 0.0 {
                    1.0
                } else if diff < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            Loss::BinaryCrossEntropy => {
                let p = prediction.clamp(PROB_EPSILON, 1.0 - PROB_EPSILON);
                (p - target) / (p * (1.0 - p))
            }
        }
    }
}
