//! Two-pass waterfall allocation of income across buckets
//!
//! Flat buckets are reserved first; percent buckets then share whatever income
//! is left. Each pass is order-independent, but the flat pass always completes
//! before the percent pass starts.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::data::{AllocationMode, Bucket, BucketKind, Income, ViewMode};
use crate::error::Advisory;

/// Allocation outcome for one bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketAllocation {
    pub id: i64,
    pub name: String,
    pub kind: BucketKind,
    pub allocation_mode: AllocationMode,
    /// Amount for the active view period
    pub calculated_amount: f64,
    /// Fraction of total income (0.25 = 25%)
    pub share_of_total: f64,
    pub starting_balance: f64,
}

/// Monthly amount allocated to a bucket, used to source extra loan principal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAllocation {
    pub id: i64,
    pub monthly_amount: f64,
}

/// Annual new money flowing into an invest bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub id: i64,
    pub name: String,
    pub annual_amount: f64,
    #[serde(default)]
    pub starting_balance: f64,
}

/// Complete waterfall result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub view_mode: ViewMode,
    pub total_income: f64,
    pub buckets: Vec<BucketAllocation>,
    pub allocated_flat: f64,
    pub remainder: f64,
    pub total_allocated: f64,
    /// May be negative when flat buckets alone exceed income
    pub unallocated: f64,
    #[serde(default)]
    pub advisories: Vec<Advisory>,
}

impl AllocationResult {
    /// Look up a bucket's allocation by id
    pub fn get(&self, id: i64) -> Option<&BucketAllocation> {
        self.buckets.iter().find(|b| b.id == id)
    }

    /// Monthly amount allocated to a bucket, if it exists
    pub fn monthly_amount(&self, id: i64) -> Option<f64> {
        self.get(id)
            .map(|b| self.view_mode.to_monthly(b.calculated_amount))
    }

    /// Monthly amounts for every bucket
    pub fn monthly_allocations(&self) -> Vec<MonthlyAllocation> {
        self.buckets
            .iter()
            .map(|b| MonthlyAllocation {
                id: b.id,
                monthly_amount: self.view_mode.to_monthly(b.calculated_amount),
            })
            .collect()
    }

    /// Annual contributions for invest buckets
    pub fn contributions(&self) -> Vec<Contribution> {
        self.buckets
            .iter()
            .filter(|b| b.kind == BucketKind::Invest)
            .map(|b| Contribution {
                id: b.id,
                name: b.name.clone(),
                annual_amount: self.view_mode.to_yearly(b.calculated_amount),
                starting_balance: b.starting_balance,
            })
            .collect()
    }

    /// Total allocated to spend buckets, in the view period
    pub fn spend_total(&self) -> f64 {
        self.buckets
            .iter()
            .filter(|b| b.kind == BucketKind::Spend)
            .map(|b| b.calculated_amount)
            .sum()
    }
}

/// Sum incomes into the active view period
pub fn normalize_income(incomes: &[Income], view_mode: ViewMode) -> f64 {
    incomes
        .iter()
        .map(|income| view_mode.from_monthly(income.monthly_amount()))
        .sum()
}

/// Run the waterfall for `total_income` (already in the view period)
///
/// Flat bucket values are monthly figures and are multiplied by 12 in yearly
/// view. Negative values pass through and produce negative allocations.
pub fn allocate(total_income: f64, buckets: &[Bucket], view_mode: ViewMode) -> AllocationResult {
    let mut advisories = Vec::new();
    if total_income < 0.0 {
        let advisory = Advisory::NegativeIncome { total_income };
        warn!("{}", advisory);
        advisories.push(advisory);
    }

    // Flat pass
    let mut amounts: Vec<Option<f64>> = buckets
        .iter()
        .map(|b| match b.allocation_mode {
            AllocationMode::Flat => Some(view_mode.from_monthly(b.value)),
            AllocationMode::Percent => None,
        })
        .collect();
    let allocated_flat: f64 = amounts.iter().flatten().sum();

    let effective_income = total_income.max(0.0);
    let remainder = (effective_income - allocated_flat).max(0.0);

    // Percent pass
    for (amount, bucket) in amounts.iter_mut().zip(buckets) {
        if amount.is_none() {
            *amount = Some(bucket.value / 100.0 * remainder);
        }
    }

    let allocations: Vec<BucketAllocation> = buckets
        .iter()
        .zip(amounts)
        .map(|(bucket, amount)| {
            let calculated_amount = amount.unwrap_or(0.0);
            let share_of_total = match bucket.allocation_mode {
                AllocationMode::Flat if total_income > 0.0 => calculated_amount / total_income,
                AllocationMode::Percent if effective_income > 0.0 => {
                    calculated_amount / effective_income
                }
                _ => 0.0,
            };
            BucketAllocation {
                id: bucket.id,
                name: bucket.name.clone(),
                kind: bucket.kind,
                allocation_mode: bucket.allocation_mode,
                calculated_amount,
                share_of_total,
                starting_balance: bucket.starting_balance,
            }
        })
        .collect();

    let total_allocated: f64 = allocations.iter().map(|b| b.calculated_amount).sum();
    let unallocated = total_income - total_allocated;

    debug!(
        "allocated {} buckets: flat={:.2} remainder={:.2} unallocated={:.2}",
        allocations.len(),
        allocated_flat,
        remainder,
        unallocated
    );

    AllocationResult {
        view_mode,
        total_income,
        buckets: allocations,
        allocated_flat,
        remainder,
        total_allocated,
        unallocated,
        advisories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::data::Frequency;
    use approx::assert_abs_diff_eq;

    fn sample_buckets() -> Vec<Bucket> {
        vec![
            Bucket::flat(1, "Rent/Mortgage", BucketKind::Spend, 2000.0),
            Bucket::percent(4, "Stock Portfolio", BucketKind::Invest, 50.0)
                .with_starting_balance(15000.0),
        ]
    }

    #[test]
    fn test_flat_then_percent_waterfall() {
        let result = allocate(5000.0, &sample_buckets(), ViewMode::Monthly);

        assert_eq!(result.get(1).unwrap().calculated_amount, 2000.0);
        assert_eq!(result.remainder, 3000.0);
        assert_eq!(result.get(4).unwrap().calculated_amount, 1500.0);
        assert_eq!(result.unallocated, 1500.0);
        assert!(result.advisories.is_empty());
    }

    #[test]
    fn test_share_of_total() {
        let result = allocate(5000.0, &sample_buckets(), ViewMode::Monthly);
        assert_abs_diff_eq!(result.get(1).unwrap().share_of_total, 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(result.get(4).unwrap().share_of_total, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_yearly_view_scales_flat_values() {
        let result = allocate(60_000.0, &sample_buckets(), ViewMode::Yearly);
        assert_eq!(result.get(1).unwrap().calculated_amount, 24_000.0);
        assert_eq!(result.get(4).unwrap().calculated_amount, 18_000.0);
        assert_eq!(result.monthly_amount(4), Some(1500.0));
    }

    #[test]
    fn test_flat_overshoot_gives_negative_unallocated() {
        let buckets = vec![
            Bucket::flat(1, "Rent", BucketKind::Spend, 3000.0),
            Bucket::flat(2, "Car", BucketKind::Spend, 1000.0),
            Bucket::percent(3, "Savings", BucketKind::Invest, 100.0),
        ];
        let result = allocate(3500.0, &buckets, ViewMode::Monthly);

        assert_eq!(result.remainder, 0.0);
        assert_eq!(result.get(3).unwrap().calculated_amount, 0.0);
        assert_eq!(result.unallocated, -500.0);
    }

    #[test]
    fn test_negative_income_is_clamped_for_percent_buckets() {
        let result = allocate(-1000.0, &sample_buckets(), ViewMode::Monthly);

        assert_eq!(result.remainder, 0.0);
        let percent = result.get(4).unwrap();
        assert_eq!(percent.calculated_amount, 0.0);
        assert_eq!(percent.share_of_total, 0.0);
        assert_eq!(result.get(1).unwrap().share_of_total, 0.0);
        assert_eq!(result.unallocated, -3000.0);
        assert!(matches!(result.advisories[0], Advisory::NegativeIncome { .. }));
    }

    #[test]
    fn test_negative_bucket_value_passes_through() {
        let buckets = vec![Bucket::flat(1, "Refund", BucketKind::Spend, -250.0)];
        let result = allocate(1000.0, &buckets, ViewMode::Monthly);

        assert_eq!(result.get(1).unwrap().calculated_amount, -250.0);
        assert_eq!(result.remainder, 1250.0);
        assert_eq!(result.unallocated, 1250.0);
    }

    #[test]
    fn test_contributions_are_annualized() {
        let monthly = allocate(5000.0, &sample_buckets(), ViewMode::Monthly);
        let contributions = monthly.contributions();

        assert_eq!(contributions.len(), 1);
        assert_eq!(contributions[0].id, 4);
        assert_eq!(contributions[0].annual_amount, 18_000.0);
        assert_eq!(contributions[0].starting_balance, 15_000.0);

        let yearly = allocate(60_000.0, &sample_buckets(), ViewMode::Yearly);
        assert_eq!(yearly.contributions()[0].annual_amount, 18_000.0);
    }

    #[test]
    fn test_normalize_income() {
        let incomes = vec![
            Income::new("Salary", 5000.0, Frequency::Monthly),
            Income::new("Bonus", 6000.0, Frequency::Yearly),
        ];
        assert_eq!(normalize_income(&incomes, ViewMode::Monthly), 5500.0);
        assert_eq!(normalize_income(&incomes, ViewMode::Yearly), 66_000.0);
    }
}
