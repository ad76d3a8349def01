//! Error types for the Quickprop optimizer.
//!
//! Numerical trouble inside the update rule (zero denominators, sign
//! reversals, runaway growth) is never reported here: the rule resolves it
//! arithmetically. Only precondition violations, configuration problems and
//! failures of the external gradient provider surface as errors.

use std::error::Error as StdError;

use thiserror::Error;

/// Result type alias for Quickprop operations.
pub type Result<T> = std::result::Result<T, QuickpropError>;

/// Errors that can occur while driving the Quickprop update rule.
#[derive(Debug, Error)]
pub enum QuickpropError {
    /// Two vectors that must be indexed identically have different lengths.
    #[error("shape mismatch in {what}: expected length {expected}, got {actual}")]
    ShapeMismatch {
        /// Which vector was checked.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Empty input where non-empty was required.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Invalid configuration parameter.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The external gradient provider failed. The provider's error is kept
    /// unchanged as the source.
    #[error("gradient provider failed: {0}")]
    Provider(#[source] Box<dyn StdError + Send + Sync>),

    /// Reading a configuration file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file was not valid JSON for [`crate::config::QuickpropConfig`].
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QuickpropError {
    /// Wraps an arbitrary provider failure.
    pub fn provider<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self::Provider(err.into())
    }
}

/// Returns `ShapeMismatch` unless `actual == expected`.
pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(QuickpropError::ShapeMismatch {
            what,
            expected,
            actual,
        })
    }
}
