//! Income and bucket records and the waterfall allocator

mod data;
mod allocation;

pub use data::{Income, Frequency, ViewMode, Bucket, BucketKind, AllocationMode};
pub use allocation::{
    allocate, normalize_income, AllocationResult, BucketAllocation, Contribution,
    MonthlyAllocation,
};
