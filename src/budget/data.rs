//! Budget input records: incomes and allocation buckets

use serde::{Deserialize, Serialize};

/// Period an amount is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Monthly,
    Yearly,
}

/// Period the allocation is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Monthly,
    Yearly,
}

impl ViewMode {
    /// Number of months in one period of this view
    pub fn months(&self) -> f64 {
        match self {
            ViewMode::Monthly => 1.0,
            ViewMode::Yearly => 12.0,
        }
    }

    /// Convert a monthly figure into this view's period
    pub fn from_monthly(&self, monthly: f64) -> f64 {
        monthly * self.months()
    }

    /// Convert a figure in this view's period into a monthly figure
    pub fn to_monthly(&self, amount: f64) -> f64 {
        amount / self.months()
    }

    /// Convert a figure in this view's period into a yearly figure
    pub fn to_yearly(&self, amount: f64) -> f64 {
        self.to_monthly(amount) * 12.0
    }
}

/// A source of income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    #[serde(default)]
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub frequency: Frequency,
}

impl Income {
    pub fn new(name: impl Into<String>, amount: f64, frequency: Frequency) -> Self {
        Self {
            name: name.into(),
            amount,
            frequency,
        }
    }

    /// Amount expressed per month
    pub fn monthly_amount(&self) -> f64 {
        match self.frequency {
            Frequency::Monthly => self.amount,
            Frequency::Yearly => self.amount / 12.0,
        }
    }
}

/// Whether a bucket's money is spent or invested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketKind {
    Spend,
    Invest,
}

/// How a bucket's value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationMode {
    /// Fixed monthly currency amount, reserved before any percentage
    Flat,
    /// Percentage of the income left after all flat buckets
    Percent,
}

/// A named destination for allocated income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub id: i64,
    pub name: String,
    #[serde(alias = "type")]
    pub kind: BucketKind,
    #[serde(alias = "allocationType")]
    pub allocation_mode: AllocationMode,
    /// Monthly currency amount (flat) or percentage (percent), not clamped
    pub value: f64,
    /// Only meaningful for invest buckets
    #[serde(default)]
    pub starting_balance: f64,
}

impl Bucket {
    pub fn flat(id: i64, name: impl Into<String>, kind: BucketKind, value: f64) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            allocation_mode: AllocationMode::Flat,
            value,
            starting_balance: 0.0,
        }
    }

    pub fn percent(id: i64, name: impl Into<String>, kind: BucketKind, value: f64) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            allocation_mode: AllocationMode::Percent,
            value,
            starting_balance: 0.0,
        }
    }

    pub fn with_starting_balance(mut self, starting_balance: f64) -> Self {
        self.starting_balance = starting_balance;
        self
    }

    pub fn is_invest(&self) -> bool {
        matches!(self.kind, BucketKind::Invest)
    }
}
