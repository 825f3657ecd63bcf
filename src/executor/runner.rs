//! Target runner
//!
//! Runs a single test target through the engine and turns whatever
//! happens into a [`RunOutcome`] value.

use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use super::engine::{EngineError, EngineRequest, TestEngine};
use crate::config::{EngineConfig, MochaOptions};
use crate::models::{RunStats, StatsError, TestTarget};
use crate::utils::Timer;

/// One target failed to produce usable stats
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("{target}: {source}")]
    Engine {
        target: TestTarget,
        #[source]
        source: EngineError,
    },

    #[error("{target}: {source}")]
    InvalidStats {
        target: TestTarget,
        #[source]
        source: StatsError,
    },
}

impl ExecutionError {
    pub fn target(&self) -> &TestTarget {
        match self {
            ExecutionError::Engine { target, .. } | ExecutionError::InvalidStats { target, .. } => {
                target
            }
        }
    }
}

/// Result of running one target
pub type RunOutcome = Result<RunStats, ExecutionError>;

/// Adapter between the batch and the engine
pub struct TargetRunner<E> {
    engine: E,
    reporter: String,
    width: u32,
    height: u32,
    visible: bool,
    chrome_args: Vec<String>,
    executable_path: Option<String>,
    reporter_output: Option<PathBuf>,
}

impl<E: TestEngine> TargetRunner<E> {
    pub fn new(engine: E, options: &MochaOptions, engine_config: &EngineConfig) -> Self {
        Self {
            engine,
            reporter: options.reporter.clone(),
            width: engine_config.width,
            height: engine_config.height,
            visible: engine_config.visible,
            chrome_args: engine_config.chrome_args.clone(),
            executable_path: engine_config.executable_path.clone(),
            reporter_output: options.reporter_options.output.clone(),
        }
    }

    /// Build the engine request for a target
    pub fn request_for(&self, target: &TestTarget) -> EngineRequest {
        EngineRequest {
            target: target.clone(),
            reporter: self.reporter.clone(),
            width: self.width,
            height: self.height,
            visible: self.visible,
            args: self.chrome_args.clone(),
            executable_path: self.executable_path.clone(),
            reporter_output: self.reporter_output.clone(),
        }
    }

    /// Run one target. Never retries.
    pub async fn run_target(&self, target: &TestTarget) -> RunOutcome {
        info!("Testing: {}", target);
        let timer = Timer::start(target.locator());

        let request = self.request_for(target);
        let outcome = match self.engine.run(&request).await {
            Ok(report) => {
                debug!("Engine exit code: {:?}", report.exit_code);
                RunStats::from_mocha(&report.stats).map_err(|source| {
                    ExecutionError::InvalidStats {
                        target: target.clone(),
                        source,
                    }
                })
            }
            Err(source) => Err(ExecutionError::Engine {
                target: target.clone(),
                source,
            }),
        };

        let elapsed_ms = timer.stop_ms();
        match &outcome {
            Ok(stats) => {
                info!("test done ({}ms)", elapsed_ms);
                debug!(
                    "{}",
                    serde_json::to_string(stats).unwrap_or_else(|_| stats.to_string())
                );
            }
            Err(e) => debug!("Target errored after {}ms: {}", elapsed_ms, e),
        }

        outcome
    }
}
