//! Data models for batch test runs
//!
//! Targets, per-target statistics, and the batch verdict.

mod stats;
mod target;
mod verdict;

pub use stats::{AggregateStats, MochaStats, RunStats, StatsError};
pub use target::TestTarget;
pub use verdict::{BatchFailure, BatchVerdict, TargetError};
