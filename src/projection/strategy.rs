//! Investment strategies within an invest bucket

use serde::{Deserialize, Serialize};

/// What happens to a strategy's yearly growth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum GrowthPolicy {
    /// Growth is added to the balance and compounds
    Reinvest,
    /// Growth is paid out as cash flow; the balance grows by contributions only
    CashOut,
}

impl From<bool> for GrowthPolicy {
    fn from(reinvest: bool) -> Self {
        if reinvest {
            GrowthPolicy::Reinvest
        } else {
            GrowthPolicy::CashOut
        }
    }
}

impl From<GrowthPolicy> for bool {
    fn from(policy: GrowthPolicy) -> Self {
        matches!(policy, GrowthPolicy::Reinvest)
    }
}

/// A sub-allocation of an invest bucket with its own return and growth policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Share of the bucket's contributions and starting balance, in percent
    #[serde(alias = "allocation")]
    pub allocation_percent: f64,

    /// Annual return in percent; may be zero or negative
    #[serde(alias = "returnRate")]
    pub annual_return_rate: f64,

    #[serde(rename = "reinvest")]
    pub growth: GrowthPolicy,
}

impl Strategy {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        allocation_percent: f64,
        annual_return_rate: f64,
        growth: GrowthPolicy,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            allocation_percent,
            annual_return_rate,
            growth,
        }
    }

    /// Stand-in for an invest bucket with no strategies: the whole bucket,
    /// growing by contributions only
    pub fn contribution_only() -> Self {
        Self::new("unconfigured", "Contributions only", 100.0, 0.0, GrowthPolicy::Reinvest)
    }

    /// Allocation as a fraction
    pub fn share(&self) -> f64 {
        self.allocation_percent / 100.0
    }

    /// Annual return as a decimal
    pub fn rate(&self) -> f64 {
        self.annual_return_rate / 100.0
    }
}

/// Sum of allocation percents across strategies
pub fn total_allocation(strategies: &[Strategy]) -> f64 {
    strategies.iter().map(|s| s.allocation_percent).sum()
}
