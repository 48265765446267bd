//! Flow & Grow - deterministic personal-finance engine
//!
//! This library provides:
//! - Two-pass waterfall allocation of income across spend and invest buckets
//! - Mortgage amortization with and without extra principal
//! - Multi-year net-worth projection across investment strategies and real estate
//! - A scenario pipeline chaining the three engines, with parallel batch runs

pub mod error;
pub mod budget;
pub mod amortization;
pub mod projection;
pub mod dashboard;
pub mod scenario;

// Re-export commonly used types
pub use error::{Advisory, EngineError, Result};
pub use budget::{allocate, normalize_income, AllocationResult, Bucket, Income, ViewMode};
pub use amortization::{amortize, standard_payment, AmortizationEngine, AmortizationSchedule, Loan, Property, Rental};
pub use projection::{ProjectionEngine, ProjectionRequest, ProjectionResult, Strategy};
pub use dashboard::DashboardSummary;
pub use scenario::{Scenario, ScenarioOutcome, ScenarioRunner};
