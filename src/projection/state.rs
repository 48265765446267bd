//! Running state for holdings during a projection

use super::strategy::{GrowthPolicy, Strategy};
use crate::amortization::{AmortizationSchedule, Property, Track};

/// Balances of one strategy on the contributing and baseline paths
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyState {
    pub strategy: Strategy,

    /// Balance with contributions
    pub balance: f64,

    /// Balance with contributions forced to zero
    pub base_balance: f64,

    /// Growth paid out so far (cash-out strategies)
    pub cash_flow: f64,

    /// Growth paid out so far on the baseline path
    pub base_cash_flow: f64,
}

impl StrategyState {
    /// Seed from the bucket's starting balance
    pub fn new(strategy: Strategy, bucket_starting_balance: f64) -> Self {
        let opening = bucket_starting_balance * strategy.share();
        Self {
            strategy,
            balance: opening,
            base_balance: opening,
            cash_flow: 0.0,
            base_cash_flow: 0.0,
        }
    }

    /// Advance one year
    ///
    /// Growth is earned on the opening balance; the year's contribution share
    /// lands at year end and is always added to the balance.
    pub fn advance_year(&mut self, bucket_contribution: f64) {
        let rate = self.strategy.rate();
        let growth = self.balance * rate;
        let base_growth = self.base_balance * rate;

        match self.strategy.growth {
            GrowthPolicy::Reinvest => {
                self.balance += growth;
                self.base_balance += base_growth;
            }
            GrowthPolicy::CashOut => {
                self.cash_flow += growth;
                self.base_cash_flow += base_growth;
            }
        }

        self.balance += bucket_contribution * self.strategy.share();
    }
}

/// An invest bucket and its strategies
#[derive(Debug, Clone)]
pub struct BucketState {
    pub id: i64,
    pub name: String,
    pub annual_contribution: f64,

    /// Months up to this one pay down a linked loan instead (0 = none)
    pub contribution_start_month: u32,

    pub strategies: Vec<StrategyState>,
}

impl BucketState {
    /// Contribution landing at the end of `year`, pro-rated to the months
    /// after `contribution_start_month`
    pub fn contribution_for_year(&self, year: u32) -> f64 {
        let months = year
            .saturating_mul(12)
            .saturating_sub(self.contribution_start_month)
            .min(12);
        match months {
            12 => self.annual_contribution,
            m => self.annual_contribution * m as f64 / 12.0,
        }
    }

    /// Advance from `year - 1` to `year`
    pub fn advance_year(&mut self, year: u32) {
        let contribution = self.contribution_for_year(year);
        for strategy in &mut self.strategies {
            strategy.advance_year(contribution);
        }
    }

    pub fn value(&self) -> f64 {
        self.strategies.iter().map(|s| s.balance).sum()
    }

    pub fn base_value(&self) -> f64 {
        self.strategies.iter().map(|s| s.base_balance).sum()
    }

    pub fn cash_flow(&self) -> f64 {
        self.strategies.iter().map(|s| s.cash_flow).sum()
    }
}

/// A property and the amortization of its mortgage
#[derive(Debug, Clone)]
pub struct PropertyState {
    pub key: String,
    pub name: String,
    pub property: Property,
    pub schedule: AmortizationSchedule,
}

impl PropertyState {
    fn debt_at_year(&self, track: Track, year: u32) -> f64 {
        self.schedule
            .balance_at_month(track, year.saturating_mul(12))
            .unwrap_or(self.property.loan.balance)
    }

    /// Appreciated value less the accelerated-track mortgage balance
    pub fn equity_at_year(&self, year: u32) -> f64 {
        self.property.value_after(year) - self.debt_at_year(Track::Accelerated, year)
    }

    /// Appreciated value less the baseline-track mortgage balance
    pub fn base_equity_at_year(&self, year: u32) -> f64 {
        self.property.value_after(year) - self.debt_at_year(Track::Baseline, year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_reinvest_compounds_then_adds_contribution() {
        let strategy = Strategy::new("s1", "Index", 100.0, 8.0, GrowthPolicy::Reinvest);
        let mut state = StrategyState::new(strategy, 15_000.0);
        state.advance_year(2400.0);

        assert_abs_diff_eq!(state.balance, 18_600.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state.base_balance, 16_200.0, epsilon = 1e-9);
        assert_eq!(state.cash_flow, 0.0);
    }

    #[test]
    fn test_cash_out_routes_growth_to_cash_flow() {
        let strategy = Strategy::new("s2", "Dividends", 100.0, 4.0, GrowthPolicy::CashOut);
        let mut state = StrategyState::new(strategy, 10_000.0);
        state.advance_year(1000.0);
        state.advance_year(1000.0);

        assert_abs_diff_eq!(state.balance, 12_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state.cash_flow, 400.0 + 440.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state.base_balance, 10_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state.base_cash_flow, 800.0, epsilon = 1e-9);
    }

    #[test]
    fn test_partial_allocation_is_not_renormalized() {
        let strategy = Strategy::new("s", "Half", 50.0, 0.0, GrowthPolicy::Reinvest);
        let mut state = StrategyState::new(strategy, 1000.0);
        state.advance_year(100.0);
        assert_eq!(state.balance, 550.0);
    }

    #[test]
    fn test_contribution_waits_for_linked_payoff() {
        let bucket = BucketState {
            id: 3,
            name: "Extra Principal".to_string(),
            annual_contribution: 1200.0,
            contribution_start_month: 18,
            strategies: vec![StrategyState::new(Strategy::contribution_only(), 0.0)],
        };

        assert_eq!(bucket.contribution_for_year(1), 0.0);
        assert_eq!(bucket.contribution_for_year(2), 600.0);
        assert_eq!(bucket.contribution_for_year(3), 1200.0);
    }

    #[test]
    fn test_negative_return_shrinks_balance() {
        let strategy = Strategy::new("s", "Short", 100.0, -10.0, GrowthPolicy::Reinvest);
        let mut state = StrategyState::new(strategy, 1000.0);
        state.advance_year(0.0);
        assert_abs_diff_eq!(state.balance, 900.0, epsilon = 1e-9);
    }
}
