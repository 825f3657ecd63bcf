//! Test statistics models
//!
//! Per-target statistics as reported by the headless engine, and the
//! batch-level aggregate built from them.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Largest duration accepted from the engine, in milliseconds
const MAX_DURATION_MS: f64 = u64::MAX as f64;

/// Engine result rejected at the adapter boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("engine reported {failures} failures for only {tests} tests")]
    FailuresExceedTests { tests: u64, failures: u64 },

    #[error("engine reported an invalid duration: {0}")]
    InvalidDuration(f64),
}

/// Raw `stats` block of a mocha run, as the engine emits it.
///
/// Counters are unsigned so negative values fail to deserialize.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MochaStats {
    #[serde(default)]
    pub suites: u64,
    pub tests: u64,
    #[serde(default)]
    pub passes: u64,
    #[serde(default)]
    pub pending: u64,
    pub failures: u64,
    /// Milliseconds
    #[serde(default)]
    pub duration: f64,
}

/// Statistics for one executed target
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub tests: u64,
    pub passes: u64,
    pub pending: u64,
    pub failures: u64,
    pub duration_ms: u64,
}

impl RunStats {
    /// Build stats from the three fields the verdict depends on
    pub fn new(tests: u64, failures: u64, duration_ms: u64) -> Self {
        Self {
            tests,
            passes: tests.saturating_sub(failures),
            pending: 0,
            failures,
            duration_ms,
        }
    }

    /// Convert and check a raw engine stats block
    pub fn from_mocha(raw: &MochaStats) -> Result<Self, StatsError> {
        if !raw.duration.is_finite() || raw.duration < 0.0 || raw.duration >= MAX_DURATION_MS {
            return Err(StatsError::InvalidDuration(raw.duration));
        }

        let stats = Self {
            tests: raw.tests,
            passes: raw.passes,
            pending: raw.pending,
            failures: raw.failures,
            duration_ms: raw.duration.round() as u64,
        };
        stats.validate()?;
        Ok(stats)
    }

    pub fn validate(&self) -> Result<(), StatsError> {
        if self.failures > self.tests {
            return Err(StatsError::FailuresExceedTests {
                tests: self.tests,
                failures: self.failures,
            });
        }
        Ok(())
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tests, {} failures ({:.2}s)",
            self.tests,
            self.failures,
            self.duration_secs()
        )
    }
}

/// Summed statistics across a batch.
///
/// Durations add up rather than taking the max since targets run one after
/// another.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub tests: u64,
    pub passes: u64,
    pub pending: u64,
    pub failures: u64,
    pub duration_ms: u64,
}

impl AggregateStats {
    /// Combine per-target stats. Empty input gives all zeros.
    ///
    /// Sums saturate at `u64::MAX`, so no input can make this fail.
    pub fn reduce<'a, I>(stats: I) -> Self
    where
        I: IntoIterator<Item = &'a RunStats>,
    {
        stats.into_iter().fold(Self::default(), |acc, s| Self {
            tests: acc.tests.saturating_add(s.tests),
            passes: acc.passes.saturating_add(s.passes),
            pending: acc.pending.saturating_add(s.pending),
            failures: acc.failures.saturating_add(s.failures),
            duration_ms: acc.duration_ms.saturating_add(s.duration_ms),
        })
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }

    pub fn is_passing(&self) -> bool {
        self.failures == 0
    }

    /// `"<tests> passed! (<duration>s)"`
    pub fn success_message(&self) -> String {
        format!("{} passed! ({:.2}s)", self.tests, self.duration_secs())
    }

    /// `"<failures>/<tests> tests failed (<duration>s)"`
    pub fn failure_message(&self) -> String {
        format!(
            "{}/{} tests failed ({:.2}s)",
            self.failures,
            self.tests,
            self.duration_secs()
        )
    }
}
