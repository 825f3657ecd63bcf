//! Configuration module
//!
//! Batch options, engine settings, config files and environment overrides.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig};
pub use file::ConfigFile;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Options for one batch run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MochaOptions {
    /// Forward page console output to the log
    pub log: bool,

    /// Mocha reporter name
    pub reporter: String,

    /// Accepted for compatibility with existing option sets. The limit the
    /// runner enforces is `EngineConfig::run_timeout_ms`.
    pub timeout: u64,

    /// Explicit URLs tested before any files
    pub urls: Vec<String>,

    /// Stop at the first target that errors
    pub bail: bool,

    /// Report page script errors as errors
    pub log_errors: bool,

    /// Send a notification when the batch passes
    pub growl_on_success: bool,

    /// Let the runner start mocha; pages that call `mocha.run()` themselves
    /// are handled the same way by the headless runner
    pub run: bool,

    pub reporter_options: ReporterOptions,
}

impl Default for MochaOptions {
    fn default() -> Self {
        Self {
            log: false,
            reporter: "spec".to_string(),
            timeout: 5000,
            urls: Vec::new(),
            bail: false,
            log_errors: false,
            growl_on_success: true,
            run: true,
            reporter_options: ReporterOptions::default(),
        }
    }
}

impl MochaOptions {
    /// Destination for captured output
    pub fn dest(&self) -> Option<&PathBuf> {
        self.reporter_options.output.as_ref()
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(reporter) = &env.reporter {
            self.reporter = reporter.clone();
        }
        if let Some(bail) = env.bail {
            self.bail = bail;
        }
        if let Some(log) = env.log {
            self.log = log;
        }
        if let Some(log_errors) = env.log_errors {
            self.log_errors = log_errors;
        }
        if let Some(growl) = env.growl_on_success {
            self.growl_on_success = growl;
        }
        if let Some(dest) = &env.dest {
            self.reporter_options.output = Some(PathBuf::from(dest));
        }
    }
}

/// Reporter-specific options
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterOptions {
    /// File the reporter output ends up in
    pub output: Option<PathBuf>,
}

/// Headless engine settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Runner executable
    pub command: String,

    /// Arguments placed before the runner flags, e.g.
    /// `["mocha-headless-chrome"]` with `command: npx`
    pub command_prefix: Vec<String>,

    /// Limit for one page run, passed to the runner as `-t` and enforced
    /// around the child process
    pub run_timeout_ms: u64,

    pub width: u32,

    pub height: u32,

    /// Show the browser window
    pub visible: bool,

    /// Chrome flags, without the leading `--`
    pub chrome_args: Vec<String>,

    /// Chrome executable to use instead of the bundled one
    pub executable_path: Option<String>,

    /// Runner flag taking the reporter output path, for runners that
    /// support writing it natively
    pub reporter_output_flag: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: "mocha-headless-chrome".to_string(),
            command_prefix: Vec::new(),
            run_timeout_ms: 120_000,
            width: 800,
            height: 600,
            visible: false,
            chrome_args: vec!["no-sandbox".to_string(), "disable-web-security".to_string()],
            executable_path: None,
            reporter_output_flag: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = MochaOptions::default();
        assert_eq!(options.reporter, "spec");
        assert_eq!(options.timeout, 5000);
        assert!(!options.bail);
        assert!(options.growl_on_success);
        assert!(options.run);
        assert!(options.dest().is_none());
    }

    #[test]
    fn test_options_use_camel_case() {
        let options: MochaOptions = serde_yaml::from_str(
            "logErrors: true\ngrowlOnSuccess: false\nreporterOptions:\n  output: out.xml\n",
        )
        .unwrap();

        assert!(options.log_errors);
        assert!(!options.growl_on_success);
        assert_eq!(options.dest(), Some(&PathBuf::from("out.xml")));
        assert_eq!(options.reporter, "spec");
    }

    #[test]
    fn test_apply_env() {
        let mut options = MochaOptions::default();
        let env = EnvConfig {
            reporter: Some("dot".to_string()),
            bail: Some(true),
            dest: Some("report.txt".to_string()),
            ..Default::default()
        };

        options.apply_env(&env);
        assert_eq!(options.reporter, "dot");
        assert!(options.bail);
        assert_eq!(options.dest(), Some(&PathBuf::from("report.txt")));
        assert_eq!(options.timeout, 5000);
    }

    #[test]
    fn test_env_timeout_does_not_touch_options() {
        let mut options = MochaOptions::default();
        options.apply_env(&EnvConfig {
            timeout: Some(1),
            ..Default::default()
        });
        assert_eq!(options, MochaOptions::default());
    }

    #[test]
    fn test_engine_defaults() {
        let engine = EngineConfig::default();
        assert!(engine.command_prefix.is_empty());
        assert_eq!(engine.run_timeout_ms, 120_000);
        assert_eq!((engine.width, engine.height), (800, 600));
        assert!(!engine.visible);
    }
}
