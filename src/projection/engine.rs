//! Multi-year net-worth projection across investment strategies and property

use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::snapshots::{HoldingSnapshot, ProjectionResult, YearSnapshot};
use super::state::{BucketState, PropertyState, StrategyState};
use super::strategy::{total_allocation, Strategy};
use crate::amortization::{
    AmortizationConfig, AmortizationEngine, ChartPoint, Property, Rental, Track,
};
use crate::budget::{Contribution, MonthlyAllocation};
use crate::error::{ensure_finite, Advisory, EngineError, Result};

/// Horizon years reported when a request does not name any
pub const DEFAULT_HORIZON_YEARS: [u32; 5] = [5, 10, 15, 20, 25];

/// Minimum number of years charted
pub const DEFAULT_CHART_YEARS: u32 = 25;

/// Upper bound on simulated years
pub const MAX_PROJECTION_YEARS: u32 = 200;

/// Tolerance when checking that strategy allocations sum to 100%
const ALLOCATION_TOLERANCE: f64 = 1e-9;

fn default_horizon_years() -> Vec<u32> {
    DEFAULT_HORIZON_YEARS.to_vec()
}

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Years charted even if every horizon is shorter
    pub chart_years: u32,

    /// Mortgage amortization settings
    pub amortization: AmortizationConfig,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            chart_years: DEFAULT_CHART_YEARS,
            amortization: AmortizationConfig::default(),
        }
    }
}

/// Inputs for one projection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRequest {
    /// Annual contribution and starting balance per invest bucket
    #[serde(default)]
    pub contributions: Vec<Contribution>,

    /// Strategies keyed by bucket id
    #[serde(default)]
    pub strategies: BTreeMap<String, Vec<Strategy>>,

    #[serde(default = "default_horizon_years", alias = "projectionYears")]
    pub horizon_years: Vec<u32>,

    #[serde(default, alias = "homeData")]
    pub home: Option<Property>,

    #[serde(default)]
    pub rentals: Vec<Rental>,

    /// Monthly amounts per bucket, used for linked extra principal
    #[serde(default)]
    pub bucket_allocations: Vec<MonthlyAllocation>,
}

impl ProjectionRequest {
    /// Strategies configured for a bucket
    pub fn strategies_for(&self, bucket_id: i64) -> Option<&[Strategy]> {
        self.strategies
            .get(&bucket_id.to_string())
            .map(Vec::as_slice)
    }

    /// Monthly extra principal supplied by a linked bucket
    fn extra_principal(&self, property: &Property) -> f64 {
        property
            .linked_bucket()
            .and_then(|id| self.bucket_allocations.iter().find(|a| a.id == id))
            .map(|a| a.monthly_amount)
            .unwrap_or(0.0)
    }
}

/// Main projection engine
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// Project net worth; `None` when the request is malformed
    pub fn project(&self, request: &ProjectionRequest) -> Option<ProjectionResult> {
        match self.try_project(request) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!("projection rejected: {}", e);
                None
            }
        }
    }

    /// Project net worth, reporting why a malformed request was rejected
    pub fn try_project(&self, request: &ProjectionRequest) -> Result<ProjectionResult> {
        validate(request)?;

        let mut result = ProjectionResult::new();
        let properties = self.build_properties(request)?;
        let mut buckets = self.build_buckets(request, &properties, &mut result.advisories);

        let horizons = dedup_in_order(&request.horizon_years);
        let last_horizon = horizons.iter().copied().max().unwrap_or(0);
        let years = self.config.chart_years.max(last_horizon);
        if years > MAX_PROJECTION_YEARS {
            return Err(EngineError::invalid_input(format!(
                "projection spans {years} years, more than {MAX_PROJECTION_YEARS}"
            )));
        }

        debug!(
            "projecting {} buckets and {} properties over {} years",
            buckets.len(),
            properties.len(),
            years
        );

        let mut snapshots: BTreeMap<u32, YearSnapshot> = BTreeMap::new();
        for year in 0..=years {
            if year > 0 {
                for bucket in &mut buckets {
                    bucket.advance_year(year);
                }
            }

            let snapshot = take_snapshot(year, &buckets, &properties);
            result.add_point(ChartPoint {
                x: year,
                baseline: snapshot.baseline_value,
                accelerated: snapshot.total_value,
            });
            if horizons.contains(&year) {
                snapshots.insert(year, snapshot);
            }
        }

        result.snapshots = horizons
            .iter()
            .filter_map(|year| snapshots.remove(year))
            .collect();

        Ok(result)
    }

    fn build_buckets(
        &self,
        request: &ProjectionRequest,
        properties: &[PropertyState],
        advisories: &mut Vec<Advisory>,
    ) -> Vec<BucketState> {
        let known: HashSet<String> = request
            .contributions
            .iter()
            .map(|c| c.id.to_string())
            .collect();
        for key in request.strategies.keys().filter(|k| !known.contains(*k)) {
            debug!("ignoring strategies for unknown bucket {}", key);
        }

        request
            .contributions
            .iter()
            .map(|contribution| {
                let strategies = match request.strategies_for(contribution.id) {
                    Some(configured) if !configured.is_empty() => {
                        let total = total_allocation(configured);
                        if (total - 100.0).abs() > ALLOCATION_TOLERANCE {
                            let advisory = Advisory::IncoherentStrategyMix {
                                bucket_id: contribution.id,
                                total_percent: total,
                            };
                            warn!("{}", advisory);
                            advisories.push(advisory);
                        }
                        configured.to_vec()
                    }
                    _ => vec![Strategy::contribution_only()],
                };

                BucketState {
                    id: contribution.id,
                    name: contribution.name.clone(),
                    annual_contribution: contribution.annual_amount,
                    contribution_start_month: contribution_start_month(contribution.id, properties),
                    strategies: strategies
                        .into_iter()
                        .map(|s| StrategyState::new(s, contribution.starting_balance))
                        .collect(),
                }
            })
            .collect()
    }

    fn build_properties(&self, request: &ProjectionRequest) -> Result<Vec<PropertyState>> {
        let amortizer = AmortizationEngine::new(self.config.amortization.clone());
        let mut properties = Vec::with_capacity(request.rentals.len() + 1);

        if let Some(home) = &request.home {
            properties.push(PropertyState {
                key: "primary-home".to_string(),
                name: "Primary Home Equity".to_string(),
                property: home.clone(),
                schedule: amortizer.try_amortize(&home.loan, request.extra_principal(home))?,
            });
        }

        for rental in &request.rentals {
            let property = &rental.property;
            properties.push(PropertyState {
                key: format!("rental-{}", rental.id),
                name: format!("{} (Equity)", property.name),
                property: property.clone(),
                schedule: amortizer.try_amortize(&property.loan, request.extra_principal(property))?,
            });
        }

        Ok(properties)
    }
}

/// First month a bucket's money stops paying extra principal
///
/// A bucket linked to one or more loans contributes only once every one of
/// them is repaid on the accelerated track; a loan still outstanding at the
/// cap keeps the bucket diverted for good.
fn contribution_start_month(bucket_id: i64, properties: &[PropertyState]) -> u32 {
    properties
        .iter()
        .filter(|p| p.property.linked_bucket() == Some(bucket_id))
        .map(|p| {
            p.schedule
                .payoff_month(Track::Accelerated)
                .unwrap_or(u32::MAX)
        })
        .max()
        .unwrap_or(0)
}

fn take_snapshot(year: u32, buckets: &[BucketState], properties: &[PropertyState]) -> YearSnapshot {
    let mut holdings = BTreeMap::new();
    let mut total_value = 0.0;
    let mut baseline_value = 0.0;

    for bucket in buckets {
        let value = bucket.value();
        let base = bucket.base_value();
        total_value += value;
        baseline_value += base;
        holdings.insert(
            bucket.id.to_string(),
            HoldingSnapshot {
                name: bucket.name.clone(),
                portfolio_value: value,
                base_value: base,
                total_cash_flow: bucket.cash_flow(),
            },
        );
    }

    for property in properties {
        let equity = property.equity_at_year(year);
        let base = property.base_equity_at_year(year);
        total_value += equity;
        baseline_value += base;
        holdings.insert(
            property.key.clone(),
            HoldingSnapshot {
                name: property.name.clone(),
                portfolio_value: equity,
                base_value: base,
                total_cash_flow: 0.0,
            },
        );
    }

    YearSnapshot {
        year,
        total_value,
        baseline_value,
        buckets: holdings,
    }
}

fn dedup_in_order(years: &[u32]) -> Vec<u32> {
    let mut seen = HashSet::new();
    years.iter().copied().filter(|y| seen.insert(*y)).collect()
}

fn validate(request: &ProjectionRequest) -> Result<()> {
    for c in &request.contributions {
        ensure_finite("annualAmount", c.annual_amount)?;
        ensure_finite("startingBalance", c.starting_balance)?;
    }
    for s in request.strategies.values().flatten() {
        ensure_finite("allocationPercent", s.allocation_percent)?;
        ensure_finite("annualReturnRate", s.annual_return_rate)?;
    }
    for a in &request.bucket_allocations {
        ensure_finite("monthlyAmount", a.monthly_amount)?;
    }
    let properties = request
        .home
        .iter()
        .chain(request.rentals.iter().map(|r| &r.property));
    for p in properties {
        ensure_finite("value", p.value)?;
        ensure_finite("appreciationRate", p.appreciation_rate)?;
    }
    Ok(())
}
