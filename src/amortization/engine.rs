//! Month-by-month amortization of baseline and accelerated tracks

use log::{debug, warn};

use super::loan::Loan;
use super::schedule::{AmortizationRow, AmortizationSchedule};
use super::state::TrackState;
use crate::error::{ensure_finite, Advisory, EngineError, Result};

/// Month limit for loans that carry no term (60 years)
pub const DEFAULT_FALLBACK_CAP_MONTHS: u32 = 720;

/// Hard ceiling on simulated months (100 years), whatever the term
pub const MAX_CAP_MONTHS: u32 = 1200;

/// Configuration for an amortization run
#[derive(Debug, Clone)]
pub struct AmortizationConfig {
    /// Safety cap used when a loan has no term; otherwise the cap is term * 12
    pub fallback_cap_months: u32,
}

impl Default for AmortizationConfig {
    fn default() -> Self {
        Self {
            fallback_cap_months: DEFAULT_FALLBACK_CAP_MONTHS,
        }
    }
}

/// Amortization engine
#[derive(Debug, Clone, Default)]
pub struct AmortizationEngine {
    config: AmortizationConfig,
}

impl AmortizationEngine {
    pub fn new(config: AmortizationConfig) -> Self {
        Self { config }
    }

    /// Number of months simulated for `loan`, never above [`MAX_CAP_MONTHS`]
    pub fn cap_months(&self, loan: &Loan) -> u32 {
        let cap = match loan.term_years {
            Some(term) if term > 0 => term.saturating_mul(12),
            _ => self.config.fallback_cap_months,
        };
        if cap > MAX_CAP_MONTHS {
            warn!("month cap {} clamped to {}", cap, MAX_CAP_MONTHS);
        }
        cap.min(MAX_CAP_MONTHS)
    }

    /// Amortize `loan` with and without `extra_monthly` principal
    ///
    /// Malformed input gives an empty schedule.
    pub fn amortize(&self, loan: &Loan, extra_monthly: f64) -> AmortizationSchedule {
        self.try_amortize(loan, extra_monthly).unwrap_or_else(|e| {
            warn!("amortization skipped: {}", e);
            AmortizationSchedule::empty()
        })
    }

    /// Amortize, reporting why malformed input was rejected
    pub fn try_amortize(&self, loan: &Loan, extra_monthly: f64) -> Result<AmortizationSchedule> {
        validate(loan, extra_monthly)?;

        let payment = loan.effective_payment();
        let monthly_rate = loan.monthly_rate();
        let cap = self.cap_months(loan);

        let mut baseline = TrackState::new(loan.balance, payment, 0.0);
        let mut accelerated = TrackState::new(loan.balance, payment, extra_monthly);

        let mut advisories = Vec::new();
        let first_interest = loan.balance * monthly_rate;
        let non_amortizing = loan.balance > 0.0 && payment <= first_interest;
        if non_amortizing {
            let advisory = Advisory::NonAmortizing {
                payment,
                interest: first_interest,
                cap,
            };
            warn!("{}", advisory);
            advisories.push(advisory);
        }

        debug!(
            "amortizing balance={:.2} rate={}% payment={:.2} extra={:.2} cap={}",
            loan.balance, loan.annual_interest_rate, payment, extra_monthly, cap
        );

        let mut rows = Vec::with_capacity(cap as usize + 1);
        rows.push(AmortizationRow::initial(loan.balance));

        for month in 1..=cap {
            if baseline.is_paid_off() && accelerated.is_paid_off() {
                break;
            }

            let base_step = baseline.step(month, monthly_rate);
            let accel_step = accelerated.step(month, monthly_rate);

            rows.push(AmortizationRow {
                month,
                baseline_balance: baseline.balance,
                accelerated_balance: accelerated.balance,
                baseline_interest: base_step.interest,
                accelerated_interest: accel_step.interest,
            });
        }

        Ok(AmortizationSchedule {
            rows,
            monthly_payment: payment,
            extra_monthly,
            cap_months: cap,
            non_amortizing,
            advisories,
        })
    }
}

/// Amortize with the default configuration
pub fn amortize(loan: &Loan, extra_monthly: f64) -> AmortizationSchedule {
    AmortizationEngine::default().amortize(loan, extra_monthly)
}

fn validate(loan: &Loan, extra_monthly: f64) -> Result<()> {
    let balance = ensure_finite("balance", loan.balance)?;
    ensure_finite("annualInterestRate", loan.annual_interest_rate)?;
    let payment = ensure_finite("monthlyPayment", loan.monthly_payment)?;
    let extra = ensure_finite("extraPrincipalMonthly", extra_monthly)?;

    if balance < 0.0 {
        return Err(EngineError::invalid_input("balance must not be negative"));
    }
    if payment < 0.0 {
        return Err(EngineError::invalid_input("monthlyPayment must not be negative"));
    }
    if extra < 0.0 {
        return Err(EngineError::invalid_input("extraPrincipalMonthly must not be negative"));
    }
    Ok(())
}
