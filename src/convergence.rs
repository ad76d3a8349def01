//! Running-mean loss tracking
//!
//! The driver does not test the raw loss against the tolerance. It keeps a
//! running mean updated with a decreasing step size,
//!
//! ```text
//! m_i = m_{i-1} + (1 / (i + 1)) * (L_i - m_{i-1}),   m_0 = sentinel (1.0)
//! ```
//!
//! and tests the change `|m_i - m_{i-1}|`. Early iterations move the mean a
//! lot; late ones barely move it. Note the `i + 1`: this is not the
//! cumulative average of the losses seen.

/// Running mean of the loss and its previous value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceTracker {
    running_mean: f64,
    previous_running_mean: f64,
    count: usize,
}

impl ConvergenceTracker {
    /// Starts a tracker whose mean is `initial_mean` before any loss is recorded.
    pub fn new(initial_mean: f64) -> Self {
        Self {
            running_mean: initial_mean,
            previous_running_mean: initial_mean,
            count: 0,
        }
    }

    /// Folds in the loss of the next iteration and returns the absolute
    /// change of the running mean.
    pub fn record(&mut self, loss: f64) -> f64 {
        self.count += 1;
        self.previous_running_mean = self.running_mean;
        let step = 1.0 / (self.count as f64 + 1.0);
        self.running_mean += step * (loss - self.running_mean);
        (self.running_mean - self.previous_running_mean).abs()
    }

    /// Current running mean.
    pub fn running_mean(&self) -> f64 {
        self.running_mean
    }

    /// Running mean before the last [`record`](Self::record).
    pub fn previous_running_mean(&self) -> f64 {
        self.previous_running_mean
    }

    /// Number of losses recorded.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Change caused by the last record, `None` before the first one.
    pub fn change(&self) -> Option<f64> {
        (self.count > 0).then(|| (self.running_mean - self.previous_running_mean).abs())
    }

    /// True once a loss has been recorded and the last change is at or below
    /// `tolerance`.
    pub fn is_converged(&self, tolerance: f64) -> bool {
        self.change().is_some_and(|change| change <= tolerance)
    }
}

impl Default for ConvergenceTracker {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_INITIAL_RUNNING_MEAN)
    }
}
