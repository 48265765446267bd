//! Net-worth projection across investment strategies and real estate

mod strategy;
mod state;
mod snapshots;
mod engine;

pub use strategy::{Strategy, GrowthPolicy, total_allocation};
pub use state::{StrategyState, BucketState, PropertyState};
pub use snapshots::{HoldingSnapshot, YearSnapshot, ProjectionResult, ProjectionSummary};
pub use engine::{
    ProjectionEngine, ProjectionConfig, ProjectionRequest,
    DEFAULT_HORIZON_YEARS, DEFAULT_CHART_YEARS, MAX_PROJECTION_YEARS,
};
