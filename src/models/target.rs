//! Test target models
//!
//! A target is one test page, addressed by a file path or a URL.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One test page to execute
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestTarget(String);

impl TestTarget {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// Get the raw locator
    pub fn locator(&self) -> &str {
        &self.0
    }

    /// Check if the locator is a URL rather than a file path
    pub fn is_url(&self) -> bool {
        let lower = self.0.to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("file://")
    }

    /// Merge explicit URLs with resolved file paths.
    ///
    /// URLs come first, then files, each in the order given. Blank entries
    /// are dropped.
    pub fn merge<U, F>(urls: U, files: F) -> Vec<TestTarget>
    where
        U: IntoIterator,
        U::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        urls.into_iter()
            .map(Into::into)
            .chain(files.into_iter().map(Into::into))
            .filter(|locator| !locator.trim().is_empty())
            .map(TestTarget)
            .collect()
    }
}

impl fmt::Display for TestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_orders_urls_before_files() {
        let targets = TestTarget::merge(
            vec!["http://localhost:8000/test.html"],
            vec!["test/a.html", "test/b.html"],
        );

        let locators: Vec<_> = targets.iter().map(|t| t.locator()).collect();
        assert_eq!(
            locators,
            vec!["http://localhost:8000/test.html", "test/a.html", "test/b.html"]
        );
    }

    #[test]
    fn test_merge_drops_blank_entries() {
        let targets = TestTarget::merge(vec!["", "  "], vec!["test/a.html", ""]);
        assert_eq!(targets, vec![TestTarget::new("test/a.html")]);
    }

    #[test]
    fn test_is_url() {
        assert!(TestTarget::new("https://example.com/runner.html").is_url());
        assert!(TestTarget::new("FILE:///tmp/runner.html").is_url());
        assert!(!TestTarget::new("test/runner.html").is_url());
    }
}
