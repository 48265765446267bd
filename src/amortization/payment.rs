//! Standard level-payment formula
//!
//! `PMT = P * r * (1+r)^n / ((1+r)^n - 1)` with `r` the monthly rate and `n`
//! the number of monthly payments.

use log::warn;

use crate::error::{EngineError, Result};

/// Standard monthly payment, reporting a zero denominator as an error
///
/// Zero principal or zero rate short-circuit to 0 before the general branch;
/// a zero-rate loan needs an explicit payment from the caller.
pub fn try_standard_payment(principal: f64, annual_rate: f64, term_years: u32) -> Result<f64> {
    if principal == 0.0 || annual_rate == 0.0 {
        return Ok(0.0);
    }

    let r = annual_rate / 100.0 / 12.0;
    let n = term_years as f64 * 12.0;
    let growth = (1.0 + r).powf(n);
    let denominator = growth - 1.0;

    let invalid = EngineError::InvalidRate {
        annual_rate,
        term_years,
    };
    if denominator == 0.0 || !denominator.is_finite() {
        return Err(invalid);
    }

    let payment = principal * r * growth / denominator;
    if payment.is_finite() {
        Ok(payment)
    } else {
        Err(invalid)
    }
}

/// Standard monthly payment, 0 when the formula is undefined
pub fn standard_payment(principal: f64, annual_rate: f64, term_years: u32) -> f64 {
    try_standard_payment(principal, annual_rate, term_years).unwrap_or_else(|e| {
        warn!("{}; using a zero payment", e);
        0.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_thirty_year_mortgage() {
        let pmt = standard_payment(350_000.0, 6.5, 30);
        assert_abs_diff_eq!(pmt, 2212.24, epsilon = 0.01);
    }

    #[test]
    fn test_degenerate_inputs_are_zero() {
        assert_eq!(standard_payment(0.0, 6.5, 30), 0.0);
        assert_eq!(standard_payment(350_000.0, 0.0, 30), 0.0);
        assert_eq!(try_standard_payment(350_000.0, 0.0, 30).unwrap(), 0.0);
    }

    #[test]
    fn test_zero_term_is_invalid_rate() {
        let result = try_standard_payment(100_000.0, 5.0, 0);
        assert!(matches!(result, Err(EngineError::InvalidRate { term_years: 0, .. })));
        assert_eq!(standard_payment(100_000.0, 5.0, 0), 0.0);
    }

    #[test]
    fn test_one_year_loan() {
        // 12 payments at 12%/yr: 1% per month
        let pmt = standard_payment(12_000.0, 12.0, 1);
        assert_abs_diff_eq!(pmt, 1066.19, epsilon = 0.01);
    }
}
