//! Point-in-time net worth and cash-flow summary

use serde::{Deserialize, Serialize};

use crate::amortization::{Property, Rental};
use crate::budget::{AllocationResult, BucketKind};

/// Headline figures for the current month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Starting balances of invest buckets
    pub invested_assets: f64,

    /// Market value of the home and rentals
    pub property_value: f64,

    pub total_assets: f64,

    /// Outstanding mortgage balances
    pub total_liabilities: f64,

    pub net_worth: f64,

    /// Total income (including rental net cash flow) per month
    pub monthly_income: f64,

    /// Spend allocations, mortgage payments and rental expenses per month
    pub monthly_burn: f64,

    /// Total property value less total mortgage, floored at zero
    pub real_estate_equity: f64,
}

impl DashboardSummary {
    pub fn build(allocation: &AllocationResult, home: Option<&Property>, rentals: &[Rental]) -> Self {
        let invested_assets: f64 = allocation
            .buckets
            .iter()
            .filter(|b| b.kind == BucketKind::Invest)
            .map(|b| b.starting_balance)
            .sum();

        let properties: Vec<&Property> = home
            .into_iter()
            .chain(rentals.iter().map(|r| &r.property))
            .collect();
        let property_value: f64 = properties.iter().map(|p| p.value).sum();
        let total_liabilities: f64 = properties.iter().map(|p| p.loan.balance).sum();

        let mortgage_payments: f64 = properties.iter().map(|p| p.loan.effective_payment()).sum();
        let rental_expenses: f64 = rentals.iter().map(Rental::monthly_expenses).sum();
        let monthly_spend = allocation.view_mode.to_monthly(allocation.spend_total());

        let total_assets = invested_assets + property_value;

        Self {
            invested_assets,
            property_value,
            total_assets,
            total_liabilities,
            net_worth: total_assets - total_liabilities,
            monthly_income: allocation.view_mode.to_monthly(allocation.total_income),
            monthly_burn: monthly_spend + mortgage_payments + rental_expenses,
            real_estate_equity: (property_value - total_liabilities).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::Loan;
    use crate::budget::{allocate, Bucket, ViewMode};
    use approx::assert_abs_diff_eq;

    fn allocation(view_mode: ViewMode) -> AllocationResult {
        let buckets = vec![
            Bucket::flat(1, "Rent", BucketKind::Spend, 1500.0),
            Bucket::percent(2, "Index Funds", BucketKind::Invest, 50.0).with_starting_balance(20_000.0),
        ];
        allocate(view_mode.from_monthly(5000.0), &buckets, view_mode)
    }

    #[test]
    fn test_dashboard_without_property() {
        let summary = DashboardSummary::build(&allocation(ViewMode::Monthly), None, &[]);

        assert_eq!(summary.total_assets, 20_000.0);
        assert_eq!(summary.net_worth, 20_000.0);
        assert_eq!(summary.monthly_income, 5000.0);
        assert_eq!(summary.monthly_burn, 1500.0);
        assert_eq!(summary.real_estate_equity, 0.0);
    }

    #[test]
    fn test_yearly_view_reports_monthly_figures() {
        let summary = DashboardSummary::build(&allocation(ViewMode::Yearly), None, &[]);
        assert_abs_diff_eq!(summary.monthly_income, 5000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.monthly_burn, 1500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_underwater_property_offsets_others() {
        let home = Property::new("Home", 300_000.0, Loan::new(250_000.0, 6.0, 30, 1500.0));
        let underwater = Rental::new(
            9,
            Property::new("Condo", 100_000.0, Loan::new(120_000.0, 7.0, 30, 800.0)),
            1000.0,
            25.0,
        );
        let summary = DashboardSummary::build(&allocation(ViewMode::Monthly), Some(&home), &[underwater]);

        assert_eq!(summary.property_value, 400_000.0);
        assert_eq!(summary.total_liabilities, 370_000.0);
        assert_eq!(summary.net_worth, 20_000.0 + 400_000.0 - 370_000.0);
        assert_eq!(summary.real_estate_equity, 30_000.0);
        assert_abs_diff_eq!(summary.monthly_burn, 1500.0 + 1500.0 + 800.0 + 250.0, epsilon = 1e-9);
    }

    #[test]
    fn test_equity_floored_when_all_underwater() {
        let home = Property::new("Home", 200_000.0, Loan::new(260_000.0, 6.0, 30, 1600.0));
        let summary = DashboardSummary::build(&allocation(ViewMode::Monthly), Some(&home), &[]);

        assert_eq!(summary.real_estate_equity, 0.0);
        assert_eq!(summary.net_worth, 20_000.0 - 60_000.0);
    }
}
