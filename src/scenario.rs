//! Scenario snapshots and the allocation → amortization → projection pipeline
//!
//! A [`Scenario`] is an immutable JSON snapshot of one household's inputs. The
//! [`ScenarioRunner`] runs the three engines over it in order and can run many
//! scenarios in parallel, each on its own snapshot.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::amortization::{
    AmortizationEngine, AmortizationSchedule, ChartPoint, PayoffSummary, Property, Rental, Track,
};
use crate::budget::{allocate, normalize_income, AllocationResult, Bucket, Income, ViewMode};
use crate::dashboard::DashboardSummary;
use crate::error::Result;
use crate::projection::{
    ProjectionConfig, ProjectionEngine, ProjectionRequest, ProjectionResult, Strategy,
    DEFAULT_HORIZON_YEARS,
};

/// Months between sampled points on loan charts
pub const DEFAULT_CHART_INTERVAL_MONTHS: u32 = 6;

fn default_horizon_years() -> Vec<u32> {
    DEFAULT_HORIZON_YEARS.to_vec()
}

fn default_chart_interval() -> u32 {
    DEFAULT_CHART_INTERVAL_MONTHS
}

/// All inputs for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub incomes: Vec<Income>,

    #[serde(default)]
    pub buckets: Vec<Bucket>,

    /// Strategies keyed by invest bucket id
    #[serde(default)]
    pub strategies: BTreeMap<String, Vec<Strategy>>,

    #[serde(default, alias = "homeData")]
    pub home: Option<Property>,

    #[serde(default)]
    pub rentals: Vec<Rental>,

    #[serde(default)]
    pub view_mode: ViewMode,

    #[serde(default = "default_horizon_years", alias = "projectionYears")]
    pub horizon_years: Vec<u32>,

    #[serde(default = "default_chart_interval")]
    pub chart_interval_months: u32,

    /// First payment date, used to report payoff dates
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: String::new(),
            incomes: Vec::new(),
            buckets: Vec::new(),
            strategies: BTreeMap::new(),
            home: None,
            rentals: Vec::new(),
            view_mode: ViewMode::default(),
            horizon_years: default_horizon_years(),
            chart_interval_months: DEFAULT_CHART_INTERVAL_MONTHS,
            start_date: None,
        }
    }
}

impl Scenario {
    /// Load a scenario from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut scenario = Self::from_reader(BufReader::new(file))?;
        if scenario.name.is_empty() {
            if let Some(stem) = path.file_stem() {
                scenario.name = stem.to_string_lossy().into_owned();
            }
        }
        Ok(scenario)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Income plus rental net cash flow, in the view period
    pub fn total_income(&self) -> f64 {
        let rental_cash_flow: f64 = self.rentals.iter().map(Rental::monthly_net_cash_flow).sum();
        normalize_income(&self.incomes, self.view_mode) + self.view_mode.from_monthly(rental_cash_flow)
    }

    /// Run the waterfall over this scenario's income and buckets
    pub fn allocate(&self) -> AllocationResult {
        allocate(self.total_income(), &self.buckets, self.view_mode)
    }

    /// Build the projection request from an allocation
    ///
    /// Every invest bucket contributes; the projection holds back a bucket
    /// linked to a loan until that loan is repaid.
    pub fn projection_request(&self, allocation: &AllocationResult) -> ProjectionRequest {
        ProjectionRequest {
            contributions: allocation.contributions(),
            strategies: self.strategies.clone(),
            horizon_years: self.horizon_years.clone(),
            home: self.home.clone(),
            rentals: self.rentals.clone(),
            bucket_allocations: allocation.monthly_allocations(),
        }
    }

    /// Monthly extra principal a property receives from its linked bucket
    pub fn extra_principal(&self, allocation: &AllocationResult, property: &Property) -> f64 {
        property
            .linked_bucket()
            .and_then(|id| allocation.monthly_amount(id))
            .unwrap_or(0.0)
    }
}

/// Amortization of one property's mortgage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanOutcome {
    pub name: String,
    pub schedule: AmortizationSchedule,
    pub payoff: PayoffSummary,
    pub chart: Vec<ChartPoint>,
    pub baseline_payoff_date: Option<NaiveDate>,
    pub accelerated_payoff_date: Option<NaiveDate>,
}

impl LoanOutcome {
    fn new(
        name: &str,
        schedule: AmortizationSchedule,
        chart_interval: u32,
        start_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            name: name.to_string(),
            payoff: schedule.payoff_summary(),
            chart: schedule.chart_points(chart_interval),
            baseline_payoff_date: start_date.and_then(|d| schedule.payoff_date(Track::Baseline, d)),
            accelerated_payoff_date: start_date
                .and_then(|d| schedule.payoff_date(Track::Accelerated, d)),
            schedule,
        }
    }
}

/// Everything produced for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcome {
    pub name: String,
    pub allocation: AllocationResult,
    pub home: Option<LoanOutcome>,
    pub rentals: Vec<LoanOutcome>,
    /// `None` when the projection input was rejected
    pub projection: Option<ProjectionResult>,
    pub dashboard: DashboardSummary,
}

/// Runs scenarios through the engines with a shared configuration
///
/// # Example
/// ```
/// use flow_grow::budget::{Bucket, BucketKind, Frequency, Income};
/// use flow_grow::scenario::{Scenario, ScenarioRunner};
///
/// let scenario = Scenario {
///     incomes: vec![Income::new("Salary", 5000.0, Frequency::Monthly)],
///     buckets: vec![
///         Bucket::flat(1, "Rent", BucketKind::Spend, 2000.0),
///         Bucket::percent(2, "Savings", BucketKind::Invest, 50.0),
///     ],
///     horizon_years: vec![1],
///     ..Default::default()
/// };
///
/// let outcomes = ScenarioRunner::default().run_batch(&[scenario.clone(), scenario]);
/// assert_eq!(outcomes.len(), 2);
/// assert_eq!(outcomes[0].allocation.unallocated, 1500.0);
///
/// let projection = outcomes[0].projection.as_ref().unwrap();
/// assert_eq!(projection.snapshot(1).unwrap().total_value, 18_000.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    config: ProjectionConfig,
}

impl ScenarioRunner {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Amortize the scenario's home loan
    pub fn amortize_home(&self, scenario: &Scenario, allocation: &AllocationResult) -> Option<LoanOutcome> {
        let engine = AmortizationEngine::new(self.config.amortization.clone());
        scenario.home.as_ref().map(|home| {
            let extra = scenario.extra_principal(allocation, home);
            let name = if home.name.is_empty() { "Primary Home" } else { home.name.as_str() };
            LoanOutcome::new(
                name,
                engine.amortize(&home.loan, extra),
                scenario.chart_interval_months,
                scenario.start_date,
            )
        })
    }

    /// Amortize each rental loan
    pub fn amortize_rentals(&self, scenario: &Scenario, allocation: &AllocationResult) -> Vec<LoanOutcome> {
        let engine = AmortizationEngine::new(self.config.amortization.clone());
        scenario
            .rentals
            .iter()
            .map(|rental| {
                let property = &rental.property;
                let extra = scenario.extra_principal(allocation, property);
                LoanOutcome::new(
                    &property.name,
                    engine.amortize(&property.loan, extra),
                    scenario.chart_interval_months,
                    scenario.start_date,
                )
            })
            .collect()
    }

    /// Run allocation, amortization and projection in order
    pub fn run(&self, scenario: &Scenario) -> ScenarioOutcome {
        debug!("running scenario '{}'", scenario.name);

        let allocation = scenario.allocate();
        let home = self.amortize_home(scenario, &allocation);
        let rentals = self.amortize_rentals(scenario, &allocation);

        let request = scenario.projection_request(&allocation);
        let projection = ProjectionEngine::new(self.config.clone()).project(&request);

        let dashboard = DashboardSummary::build(&allocation, scenario.home.as_ref(), &scenario.rentals);

        ScenarioOutcome {
            name: scenario.name.clone(),
            allocation,
            home,
            rentals,
            projection,
            dashboard,
        }
    }

    /// Run many scenarios in parallel
    pub fn run_batch(&self, scenarios: &[Scenario]) -> Vec<ScenarioOutcome> {
        scenarios.par_iter().map(|s| self.run(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::Loan;
    use crate::budget::BucketKind;
    use crate::projection::GrowthPolicy;
    use approx::assert_abs_diff_eq;

    fn household() -> Scenario {
        let mut strategies = BTreeMap::new();
        strategies.insert(
            "4".to_string(),
            vec![
                Strategy::new("s1", "S&P 500 ETF", 80.0, 8.0, GrowthPolicy::Reinvest),
                Strategy::new("s2", "Dividend Stocks", 20.0, 4.0, GrowthPolicy::CashOut),
            ],
        );
        Scenario {
            name: "household".to_string(),
            incomes: vec![Income::new("Salary", 5000.0, crate::budget::Frequency::Monthly)],
            buckets: vec![
                Bucket::flat(1, "Rent", BucketKind::Spend, 1500.0),
                Bucket::flat(2, "Utilities", BucketKind::Spend, 200.0),
                Bucket::flat(3, "Extra Principal", BucketKind::Invest, 300.0),
                Bucket::percent(4, "Stock Portfolio", BucketKind::Invest, 50.0)
                    .with_starting_balance(15_000.0),
            ],
            strategies,
            home: Some(
                Property::new("Home", 450_000.0, Loan::with_standard_payment(350_000.0, 6.5, 30))
                    .linked_to(3),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_run_links_extra_principal() {
        let outcome = ScenarioRunner::default().run(&household());

        let home = outcome.home.unwrap();
        assert_eq!(home.schedule.extra_monthly, 300.0);
        assert!(home.payoff.months_saved > 0);
        assert!(home.payoff.interest_saved > 0.0);
        assert!(outcome.projection.is_some());
    }

    #[test]
    fn test_every_invest_bucket_contributes() {
        let scenario = household();
        let allocation = scenario.allocate();
        let request = scenario.projection_request(&allocation);

        let linked = request.contributions.iter().find(|c| c.id == 3).unwrap();
        assert_eq!(linked.annual_amount, 3600.0);
        let stocks = request.contributions.iter().find(|c| c.id == 4).unwrap();
        // (5000 - 2000) * 50% per month
        assert_abs_diff_eq!(stocks.annual_amount, 1500.0 * 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_linked_bucket_invests_after_loan_is_repaid() {
        let mut scenario = household();
        scenario.home = Some(
            Property::new("Home", 450_000.0, Loan::with_standard_payment(20_000.0, 5.0, 30))
                .linked_to(3),
        );
        scenario.horizon_years = vec![1, 10];

        let outcome = ScenarioRunner::default().run(&scenario);
        let payoff = outcome.home.unwrap().payoff.accelerated_payoff_month.unwrap();
        assert!(payoff > 12 && payoff < 108);

        let projection = outcome.projection.unwrap();
        let year_one = &projection.snapshot(1).unwrap().buckets["3"];
        assert_eq!(year_one.portfolio_value, 0.0);

        // Full 3600/yr once repaid, pro-rated in the payoff year
        let months_invested = 120 - payoff;
        let year_ten = &projection.snapshot(10).unwrap().buckets["3"];
        assert_abs_diff_eq!(
            year_ten.portfolio_value,
            300.0 * months_invested as f64,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_rental_cash_flow_adds_to_income() {
        let mut scenario = household();
        scenario.rentals.push(Rental::new(
            101,
            Property::new("Condo", 250_000.0, Loan::new(180_000.0, 7.0, 30, 1197.0)),
            1800.0,
            40.0,
        ));
        assert_abs_diff_eq!(scenario.total_income(), 5000.0 - 117.0, epsilon = 1e-9);

        scenario.view_mode = ViewMode::Yearly;
        assert_abs_diff_eq!(scenario.total_income(), (5000.0 - 117.0) * 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_payoff_dates_follow_start_date() {
        let mut scenario = household();
        scenario.start_date = NaiveDate::from_ymd_opt(2025, 1, 1);
        let home = ScenarioRunner::default().run(&scenario).home.unwrap();

        let baseline = home.baseline_payoff_date.unwrap();
        let accelerated = home.accelerated_payoff_date.unwrap();
        assert!(accelerated < baseline);
        assert_eq!(baseline, NaiveDate::from_ymd_opt(2055, 1, 1).unwrap());
    }

    #[test]
    fn test_run_batch_matches_sequential() {
        let runner = ScenarioRunner::default();
        let scenarios = vec![household(), Scenario::default(), household()];

        let batch = runner.run_batch(&scenarios);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0], runner.run(&scenarios[0]));
        assert_eq!(batch[0], batch[2]);
    }

    #[test]
    fn test_scenario_from_json() {
        let json = r#"{
            "incomes": [{"name": "Salary", "amount": 60000, "frequency": "yearly"}],
            "buckets": [
                {"id": 1, "name": "Rent", "type": "spend", "allocationType": "flat", "value": 1500},
                {"id": 4, "name": "Stocks", "type": "invest", "allocationType": "percent", "value": 50, "startingBalance": 15000}
            ],
            "projectionYears": [10]
        }"#;
        let scenario = Scenario::from_reader(json.as_bytes()).unwrap();

        assert_eq!(scenario.chart_interval_months, DEFAULT_CHART_INTERVAL_MONTHS);
        assert_eq!(scenario.horizon_years, vec![10]);
        assert_abs_diff_eq!(scenario.total_income(), 5000.0, epsilon = 1e-9);
    }
}
