//! Run many scenario files in parallel and write a one-line summary per scenario
//!
//! Environment:
//! - `CHART_YEARS`: minimum projection years (default 25)
//! - `OUTPUT_PATH`: CSV destination (default `batch_summary.csv`)

use std::env;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;

use flow_grow::projection::{ProjectionConfig, DEFAULT_CHART_YEARS};
use flow_grow::scenario::{Scenario, ScenarioOutcome, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(name = "run_batch", about = "Run scenario files through the full pipeline")]
struct Args {
    /// Scenario files, or directories of `*.json` scenarios
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write full outcomes as JSON instead of the CSV summary
    #[arg(long)]
    json: bool,
}

/// One summary row per scenario
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryRow {
    scenario: String,
    total_income: f64,
    unallocated: f64,
    net_worth: f64,
    monthly_burn: f64,
    home_months_saved: Option<u32>,
    home_interest_saved: Option<f64>,
    final_year: Option<u32>,
    final_value: Option<f64>,
    final_baseline: Option<f64>,
    advisories: usize,
}

impl From<&ScenarioOutcome> for SummaryRow {
    fn from(outcome: &ScenarioOutcome) -> Self {
        let summary = outcome.projection.as_ref().map(|p| p.summary());
        let advisories = outcome.allocation.advisories.len()
            + outcome.home.iter().map(|h| h.schedule.advisories.len()).sum::<usize>()
            + outcome.rentals.iter().map(|r| r.schedule.advisories.len()).sum::<usize>()
            + outcome.projection.as_ref().map_or(0, |p| p.advisories.len());

        Self {
            scenario: outcome.name.clone(),
            total_income: outcome.allocation.total_income,
            unallocated: outcome.allocation.unallocated,
            net_worth: outcome.dashboard.net_worth,
            monthly_burn: outcome.dashboard.monthly_burn,
            home_months_saved: outcome.home.as_ref().map(|h| h.payoff.months_saved),
            home_interest_saved: outcome.home.as_ref().map(|h| h.payoff.interest_saved),
            final_year: summary.as_ref().map(|s| s.years),
            final_value: summary.as_ref().map(|s| s.final_value),
            final_baseline: summary.as_ref().map(|s| s.final_baseline),
            advisories,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let chart_years: u32 = env::var("CHART_YEARS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_CHART_YEARS);
    let default_output = if args.json { "batch_outcomes.json" } else { "batch_summary.csv" };
    let output_path = env::var("OUTPUT_PATH").unwrap_or_else(|_| default_output.to_string());

    let paths = collect_paths(&args.inputs)?;
    let scenarios = paths
        .iter()
        .map(|p| Scenario::from_path(p).with_context(|| format!("failed to load {}", p.display())))
        .collect::<Result<Vec<_>>>()?;
    info!("Loaded {} scenarios in {:?}", scenarios.len(), start.elapsed());

    let runner = ScenarioRunner::new(ProjectionConfig {
        chart_years,
        ..Default::default()
    });

    let run_start = Instant::now();
    let outcomes = runner.run_batch(&scenarios);
    info!("Ran {} scenarios in {:?}", outcomes.len(), run_start.elapsed());

    for outcome in outcomes.iter().filter(|o| o.projection.is_none()) {
        warn!("scenario '{}' has no projection", outcome.name);
    }

    let file = File::create(&output_path)
        .with_context(|| format!("failed to create {output_path}"))?;
    if args.json {
        serde_json::to_writer_pretty(BufWriter::new(file), &outcomes)?;
    } else {
        let mut writer = csv::Writer::from_writer(BufWriter::new(file));
        for outcome in &outcomes {
            writer.serialize(SummaryRow::from(outcome))?;
        }
        writer.flush()?;
    }

    info!("Output written to {} (total {:?})", output_path, start.elapsed());
    Ok(())
}

fn collect_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries = json_files(input)?;
            entries.sort();
            paths.extend(entries);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(files)
}
