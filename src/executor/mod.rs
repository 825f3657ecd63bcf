//! Test execution engine
//!
//! The headless engine seam, the per-target runner, and the sequential
//! batch orchestrator.

mod batch;
mod engine;
mod runner;

pub use batch::{BatchOrchestrator, BatchState};
pub use engine::{EngineError, EngineReport, EngineRequest, HeadlessChromeEngine, TestEngine};
pub use runner::{ExecutionError, RunOutcome, TargetRunner};
