//! Error and advisory types
//!
//! The engines never fail on well-typed numeric input. Out-of-range numbers are
//! converted into bounded results and reported as [`Advisory`] values; only
//! structurally invalid input is rejected with an [`EngineError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that reject an input outright
#[derive(Error, Debug)]
pub enum EngineError {
    /// A required field is missing, non-finite, or otherwise unusable
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Payment formula denominator `(1+r)^n - 1` is zero or not finite
    #[error("Invalid rate: {annual_rate}% over {term_years} years gives a zero payment denominator")]
    InvalidRate { annual_rate: f64, term_years: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Non-fatal conditions surfaced alongside a result
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Advisory {
    /// Monthly payment does not cover monthly interest on the baseline track
    #[error("Payment {payment:.2} does not cover monthly interest {interest:.2}; schedule stops at month {cap}")]
    NonAmortizing { payment: f64, interest: f64, cap: u32 },

    /// Strategy allocations under a bucket do not sum to 100%
    #[error("Strategies for bucket {bucket_id} allocate {total_percent}% of contributions")]
    IncoherentStrategyMix { bucket_id: i64, total_percent: f64 },

    /// Total income is negative; percent buckets are allocated against zero
    #[error("Total income {total_income:.2} is negative; percent buckets allocated against zero")]
    NegativeIncome { total_income: f64 },
}

/// Reject non-finite values in a named field
pub(crate) fn ensure_finite(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::invalid_input(format!("{field} must be finite, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advisory_messages() {
        let advisory = Advisory::IncoherentStrategyMix {
            bucket_id: 4,
            total_percent: 80.0,
        };
        assert_eq!(
            advisory.to_string(),
            "Strategies for bucket 4 allocate 80% of contributions"
        );
    }

    #[test]
    fn test_ensure_finite() {
        assert!(ensure_finite("rate", 6.5).is_ok());
        assert!(matches!(
            ensure_finite("rate", f64::NAN),
            Err(EngineError::InvalidInput { .. })
        ));
    }
}
