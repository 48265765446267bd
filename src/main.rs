//! Flow & Grow CLI
//!
//! Runs the allocation, amortization and projection engines over a scenario file

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;

use flow_grow::amortization::Track;
use flow_grow::projection::{ProjectionConfig, ProjectionEngine, DEFAULT_CHART_YEARS};
use flow_grow::scenario::{Scenario, ScenarioRunner};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Parser, Debug)]
#[command(
    name = "flow-grow",
    about = "Income allocation, mortgage amortization and net-worth projection"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    format: OutputFormat,

    #[arg(
        long,
        default_value_t = DEFAULT_CHART_YEARS,
        global = true,
        help = "Minimum number of years on the projection chart"
    )]
    chart_years: u32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split income across buckets
    Allocate { scenario: PathBuf },
    /// Amortize the home loan (or a rental with --rental)
    Amortize {
        scenario: PathBuf,
        #[arg(long, help = "Rental id to amortize instead of the home loan")]
        rental: Option<i64>,
    },
    /// Project net worth over the scenario's horizons
    Project { scenario: PathBuf },
    /// Run the full pipeline
    Run { scenario: PathBuf },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AllocationRow<'a> {
    id: i64,
    name: &'a str,
    calculated_amount: f64,
    share_of_total: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionRow {
    year: u32,
    baseline: f64,
    accelerated: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = ProjectionConfig {
        chart_years: cli.chart_years,
        ..Default::default()
    };
    let runner = ScenarioRunner::new(config.clone());
    let stdout = io::stdout();

    match &cli.command {
        Command::Allocate { scenario } => {
            let scenario = load(scenario)?;
            let allocation = scenario.allocate();
            match cli.format {
                OutputFormat::Json => write_json(stdout.lock(), &allocation)?,
                OutputFormat::Csv => write_csv(
                    stdout.lock(),
                    allocation.buckets.iter().map(|b| AllocationRow {
                        id: b.id,
                        name: &b.name,
                        calculated_amount: b.calculated_amount,
                        share_of_total: b.share_of_total,
                    }),
                )?,
            }
        }
        Command::Amortize { scenario, rental } => {
            let scenario = load(scenario)?;
            let allocation = scenario.allocate();
            let outcome = match rental {
                Some(id) => {
                    let index = scenario
                        .rentals
                        .iter()
                        .position(|r| r.id == *id)
                        .with_context(|| format!("no rental with id {id}"))?;
                    runner.amortize_rentals(&scenario, &allocation).swap_remove(index)
                }
                None => runner
                    .amortize_home(&scenario, &allocation)
                    .context("scenario has no home loan")?,
            };
            info!(
                "baseline payoff {:?}, accelerated payoff {:?}",
                outcome.schedule.payoff_month(Track::Baseline),
                outcome.schedule.payoff_month(Track::Accelerated)
            );
            match cli.format {
                OutputFormat::Json => write_json(stdout.lock(), &outcome)?,
                OutputFormat::Csv => write_csv(stdout.lock(), outcome.schedule.rows.iter())?,
            }
        }
        Command::Project { scenario } => {
            let scenario = load(scenario)?;
            let request = scenario.projection_request(&scenario.allocate());
            let result = ProjectionEngine::new(config)
                .try_project(&request)
                .context("projection rejected")?;
            info!("final net worth {:.2}", result.summary().final_value);
            match cli.format {
                OutputFormat::Json => write_json(stdout.lock(), &result)?,
                OutputFormat::Csv => write_csv(
                    stdout.lock(),
                    result.chart_data.iter().map(|p| ProjectionRow {
                        year: p.x,
                        baseline: p.baseline,
                        accelerated: p.accelerated,
                    }),
                )?,
            }
        }
        Command::Run { scenario } => {
            let scenario = load(scenario)?;
            let outcome = runner.run(&scenario);
            write_json(stdout.lock(), &outcome)?;
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<Scenario> {
    Scenario::from_path(path).with_context(|| format!("failed to load scenario {}", path.display()))
}

fn write_json<W: Write, T: Serialize>(mut out: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn write_csv<W: Write, T: Serialize>(out: W, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
