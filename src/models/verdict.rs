//! Batch verdict models
//!
//! The terminal, externally observed result of one batch run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{AggregateStats, TestTarget};

/// How a batch failed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BatchFailure {
    /// Failures were counted but the batch ran to completion
    Soft,
    /// Fail-fast escalated counted failures after every target ran
    Hard { cause: String },
    /// Fail-fast stopped the batch at an execution error
    Aborted { cause: String },
}

impl BatchFailure {
    pub fn is_hard(&self) -> bool {
        matches!(self, BatchFailure::Hard { .. } | BatchFailure::Aborted { .. })
    }
}

/// A target whose engine run did not produce stats
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetError {
    pub target: TestTarget,
    pub message: String,
}

/// Result of one batch run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchVerdict {
    pub aggregate: AggregateStats,
    pub succeeded: bool,
    pub failure: Option<BatchFailure>,
    /// Targets handed to the engine, including ones that errored
    pub attempted: usize,
    pub errors: Vec<TargetError>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl BatchVerdict {
    /// Decide the verdict for a finished batch.
    ///
    /// `aborted` carries the execution error that stopped a fail-fast batch.
    pub fn decide(
        aggregate: AggregateStats,
        bail: bool,
        aborted: Option<String>,
        attempted: usize,
        errors: Vec<TargetError>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let failure = match aborted {
            Some(cause) => Some(BatchFailure::Aborted { cause }),
            None if aggregate.is_passing() => None,
            None if bail => Some(BatchFailure::Hard {
                cause: aggregate.failure_message(),
            }),
            None => Some(BatchFailure::Soft),
        };

        Self {
            aggregate,
            succeeded: failure.is_none(),
            failure,
            attempted,
            errors,
            started_at,
            completed_at: Utc::now(),
        }
    }

    /// Human-readable one-line summary
    pub fn summary(&self) -> String {
        match &self.failure {
            None => self.aggregate.success_message(),
            Some(BatchFailure::Aborted { cause }) => {
                format!("{}, aborted: {}", self.aggregate.failure_message(), cause)
            }
            Some(_) => self.aggregate.failure_message(),
        }
    }

    pub fn is_hard_failure(&self) -> bool {
        self.failure.as_ref().is_some_and(BatchFailure::is_hard)
    }
}

impl fmt::Display for BatchVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = if self.succeeded { "✓" } else { "✗" };
        write!(f, "{} {}", symbol, self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunStats;

    fn aggregate(tests: u64, failures: u64) -> AggregateStats {
        AggregateStats::reduce(&[RunStats::new(tests, failures, 500)])
    }

    #[test]
    fn test_passing_batch_succeeds() {
        let verdict = BatchVerdict::decide(aggregate(4, 0), true, None, 1, Vec::new(), Utc::now());
        assert!(verdict.succeeded);
        assert!(verdict.failure.is_none());
        assert_eq!(verdict.summary(), "4 passed! (0.50s)");
    }

    #[test]
    fn test_failures_without_bail_are_soft() {
        let verdict =
            BatchVerdict::decide(aggregate(4, 1), false, None, 1, Vec::new(), Utc::now());
        assert!(!verdict.succeeded);
        assert_eq!(verdict.failure, Some(BatchFailure::Soft));
        assert!(!verdict.is_hard_failure());
    }

    #[test]
    fn test_failures_with_bail_are_hard() {
        let verdict = BatchVerdict::decide(aggregate(4, 1), true, None, 1, Vec::new(), Utc::now());
        assert!(!verdict.succeeded);
        assert_eq!(
            verdict.failure,
            Some(BatchFailure::Hard {
                cause: "1/4 tests failed (0.50s)".to_string()
            })
        );
    }

    #[test]
    fn test_abort_is_hard_even_without_failures() {
        let verdict = BatchVerdict::decide(
            aggregate(4, 0),
            true,
            Some("engine crashed".to_string()),
            2,
            Vec::new(),
            Utc::now(),
        );
        assert!(!verdict.succeeded);
        assert!(verdict.is_hard_failure());
        assert_eq!(
            verdict.failure,
            Some(BatchFailure::Aborted {
                cause: "engine crashed".to_string()
            })
        );
        assert_eq!(
            verdict.summary(),
            "0/4 tests failed (0.50s), aborted: engine crashed"
        );
    }

    #[test]
    fn test_failure_kind_serializes_tagged() {
        let aborted = BatchFailure::Aborted {
            cause: "t2: timeout".to_string(),
        };
        let value = serde_json::to_value(&aborted).unwrap();
        assert_eq!(value["kind"], "aborted");
        assert_eq!(value["cause"], "t2: timeout");
    }
}
