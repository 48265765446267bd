//! Loan amortization: payment formula, baseline vs. accelerated schedules

mod loan;
mod payment;
mod state;
mod schedule;
mod engine;

pub use loan::{Loan, Property, Rental, NO_LINKED_BUCKET, DEFAULT_APPRECIATION_RATE};
pub use payment::{standard_payment, try_standard_payment};
pub use state::{TrackState, MonthStep, PAYOFF_EPSILON};
pub use schedule::{AmortizationRow, AmortizationSchedule, ChartPoint, PayoffSummary, Termination, Track};
pub use engine::{amortize, AmortizationConfig, AmortizationEngine, DEFAULT_FALLBACK_CAP_MONTHS, MAX_CAP_MONTHS};
