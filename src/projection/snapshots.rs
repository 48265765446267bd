//! Projection output structures

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::amortization::ChartPoint;
use crate::error::Advisory;

/// One holding (invest bucket or property) at a horizon year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingSnapshot {
    pub name: String,
    /// Value with contributions (or equity on the accelerated track)
    pub portfolio_value: f64,
    /// Value on the no-contribution baseline
    pub base_value: f64,
    /// Growth paid out so far by cash-out strategies
    pub total_cash_flow: f64,
}

/// Net worth at a horizon year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSnapshot {
    pub year: u32,
    pub total_value: f64,
    pub baseline_value: f64,
    /// Keyed by bucket id, `primary-home` or `rental-<id>`
    pub buckets: BTreeMap<String, HoldingSnapshot>,
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    /// One entry per requested horizon year, in request order
    pub snapshots: Vec<YearSnapshot>,

    /// Net worth by year: `baseline` without contributions, `accelerated` with
    pub chart_data: Vec<ChartPoint>,

    #[serde(default)]
    pub advisories: Vec<Advisory>,
}

impl ProjectionResult {
    pub fn new() -> Self {
        Self {
            snapshots: Vec::new(),
            chart_data: Vec::new(),
            advisories: Vec::new(),
        }
    }

    pub fn add_point(&mut self, point: ChartPoint) {
        self.chart_data.push(point);
    }

    /// Snapshot for a horizon year
    pub fn snapshot(&self, year: u32) -> Option<&YearSnapshot> {
        self.snapshots.iter().find(|s| s.year == year)
    }

    /// Summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let first = self.chart_data.first();
        let last = self.chart_data.last();
        let starting_net_worth = first.map(|p| p.accelerated).unwrap_or(0.0);
        let final_value = last.map(|p| p.accelerated).unwrap_or(0.0);
        let final_baseline = last.map(|p| p.baseline).unwrap_or(0.0);

        ProjectionSummary {
            years: last.map(|p| p.x).unwrap_or(0),
            starting_net_worth,
            final_value,
            final_baseline,
            value_from_contributions: final_value - final_baseline,
        }
    }
}

impl Default for ProjectionResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub years: u32,
    pub starting_net_worth: f64,
    pub final_value: f64,
    pub final_baseline: f64,
    pub value_from_contributions: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_reads_chart_endpoints() {
        let mut result = ProjectionResult::new();
        result.add_point(ChartPoint { x: 0, baseline: 100.0, accelerated: 100.0 });
        result.add_point(ChartPoint { x: 1, baseline: 110.0, accelerated: 150.0 });

        let summary = result.summary();
        assert_eq!(summary.years, 1);
        assert_eq!(summary.starting_net_worth, 100.0);
        assert_eq!(summary.value_from_contributions, 40.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut result = ProjectionResult::new();
        result.snapshots.push(YearSnapshot {
            year: 5,
            total_value: 1.0,
            baseline_value: 1.0,
            buckets: BTreeMap::new(),
        });
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["snapshots"][0].get("totalValue").is_some());
        assert!(json.get("chartData").is_some());
    }
}
