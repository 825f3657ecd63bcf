//! Output formatters for batch verdicts
//!
//! Provides table, JSON, and one-line summary formats.

use anyhow::{Context, Result};
use std::path::Path;

use crate::models::{BatchFailure, BatchVerdict};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Verdict formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format a batch verdict
    pub fn format_verdict(&self, verdict: &BatchVerdict) -> String {
        match self.format {
            OutputFormat::Table => self.format_verdict_table(verdict),
            OutputFormat::Json => serde_json::to_string(verdict).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(verdict).unwrap_or_default(),
            OutputFormat::Summary => self.format_verdict_brief(verdict),
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.colorize {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn status_label(&self, verdict: &BatchVerdict) -> String {
        match &verdict.failure {
            None => self.paint("✓ PASS", "32"),
            Some(BatchFailure::Soft) => self.paint("✗ FAIL", "31"),
            Some(BatchFailure::Hard { .. } | BatchFailure::Aborted { .. }) => {
                self.paint("! FATAL", "31")
            }
        }
    }

    fn format_verdict_table(&self, verdict: &BatchVerdict) -> String {
        let aggregate = &verdict.aggregate;
        let mut output = String::new();

        output.push_str("\n╔══════════════════════════════════════════════════════════════╗\n");
        output.push_str(&format!("║  Batch Result: {}\n", self.status_label(verdict)));
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");
        output.push_str(&format!(
            "║  Targets: {:3} | Tests: {:5} | Pass: {:5} | Pending: {:4}\n",
            verdict.attempted, aggregate.tests, aggregate.passes, aggregate.pending
        ));

        let failures = aggregate.failures.to_string();
        let failures = if aggregate.failures > 0 {
            self.paint(&failures, "31")
        } else {
            failures
        };
        output.push_str(&format!(
            "║  Failures: {} | Duration: {:.2}s\n",
            failures,
            aggregate.duration_secs()
        ));

        if !verdict.errors.is_empty() {
            output.push_str("╠══════════════════════════════════════════════════════════════╣\n");
            for error in &verdict.errors {
                output.push_str(&format!("║  ! {}\n", error.message));
            }
        }
        match &verdict.failure {
            Some(BatchFailure::Aborted { cause }) => {
                output.push_str(&format!("║  Aborted: {cause}\n"));
            }
            Some(BatchFailure::Hard { cause }) => {
                output.push_str(&format!("║  Bailed: {cause}\n"));
            }
            _ => {}
        }

        output.push_str("╚══════════════════════════════════════════════════════════════╝");
        output
    }

    fn format_verdict_brief(&self, verdict: &BatchVerdict) -> String {
        let symbol = if verdict.succeeded { "✓" } else { "✗" };
        format!("{} {}", symbol, verdict.summary())
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

/// Save a verdict as pretty JSON
pub fn write_report(path: impl AsRef<Path>, verdict: &BatchVerdict) -> Result<()> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(verdict).context("Failed to serialize verdict")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    Ok(())
}
