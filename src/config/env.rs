//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "MOCHA_BATCH";

/// Overrides read from the environment
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Reporter from MOCHA_BATCH_REPORTER
    pub reporter: Option<String>,
    /// Runner timeout from MOCHA_BATCH_TIMEOUT
    pub timeout: Option<u64>,
    /// Bail from MOCHA_BATCH_BAIL
    pub bail: Option<bool>,
    /// Console logging from MOCHA_BATCH_LOG
    pub log: Option<bool>,
    /// Error logging from MOCHA_BATCH_LOG_ERRORS
    pub log_errors: Option<bool>,
    /// Success notification from MOCHA_BATCH_GROWL_ON_SUCCESS
    pub growl_on_success: Option<bool>,
    /// Captured output destination from MOCHA_BATCH_DEST
    pub dest: Option<String>,
    /// Config file from MOCHA_BATCH_CONFIG
    pub config_file: Option<String>,
    /// Log level from MOCHA_BATCH_LOG_LEVEL
    pub log_level: Option<String>,
    /// Engine command from MOCHA_BATCH_ENGINE
    pub engine: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            reporter: get_env("REPORTER"),
            timeout: get_env_parse("TIMEOUT"),
            bail: get_env_bool("BAIL"),
            log: get_env_bool("LOG"),
            log_errors: get_env_bool("LOG_ERRORS"),
            growl_on_success: get_env_bool("GROWL_ON_SUCCESS"),
            dest: get_env("DEST"),
            config_file: get_env("CONFIG"),
            log_level: get_env("LOG_LEVEL"),
            engine: get_env("ENGINE"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.reporter.is_some()
            || self.timeout.is_some()
            || self.bail.is_some()
            || self.log.is_some()
            || self.log_errors.is_some()
            || self.growl_on_success.is_some()
            || self.dest.is_some()
            || self.config_file.is_some()
            || self.log_level.is_some()
            || self.engine.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_REPORTER:          {:?}", ENV_PREFIX, self.reporter);
        println!("  {}_TIMEOUT:           {:?}", ENV_PREFIX, self.timeout);
        println!("  {}_BAIL:              {:?}", ENV_PREFIX, self.bail);
        println!("  {}_LOG:               {:?}", ENV_PREFIX, self.log);
        println!("  {}_LOG_ERRORS:        {:?}", ENV_PREFIX, self.log_errors);
        println!("  {}_GROWL_ON_SUCCESS:  {:?}", ENV_PREFIX, self.growl_on_success);
        println!("  {}_DEST:              {:?}", ENV_PREFIX, self.dest);
        println!("  {}_CONFIG:            {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_LOG_LEVEL:         {:?}", ENV_PREFIX, self.log_level);
        println!("  {}_ENGINE:            {:?}", ENV_PREFIX, self.engine);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| parse_bool(&v))
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "enabled"
    )
}

/// Print all MOCHA_BATCH environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_REPORTER          Mocha reporter (spec, dot, xunit, ...)");
    println!("  {ENV_PREFIX}_TIMEOUT           Runner limit for one page in milliseconds");
    println!("  {ENV_PREFIX}_BAIL              Stop at the first erroring page (true/false)");
    println!("  {ENV_PREFIX}_LOG               Forward page console output (true/false)");
    println!("  {ENV_PREFIX}_LOG_ERRORS        Report page errors as errors (true/false)");
    println!("  {ENV_PREFIX}_GROWL_ON_SUCCESS  Notify when the batch passes (true/false)");
    println!("  {ENV_PREFIX}_DEST              File receiving reporter output");
    println!("  {ENV_PREFIX}_CONFIG            Path to configuration file");
    println!("  {ENV_PREFIX}_LOG_LEVEL         Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_ENGINE            Headless runner command");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_REPORTER=xunit");
    println!("  export {ENV_PREFIX}_DEST=reports/xunit.xml");
    println!("  mocha-batch run test/*.html");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.reporter.is_none());
        assert!(!config.has_any());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("1"));
        assert!(parse_bool("on"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("nope"));
    }

    #[test]
    fn test_env_lookup() {
        env::set_var("MOCHA_BATCH_ENGINE", "/opt/runner");
        let config = EnvConfig::load();
        env::remove_var("MOCHA_BATCH_ENGINE");

        assert_eq!(config.engine.as_deref(), Some("/opt/runner"));
        assert!(config.has_any());
    }

    #[test]
    fn test_has_any() {
        let with_bail = EnvConfig {
            bail: Some(true),
            ..Default::default()
        };
        assert!(with_bail.has_any());
    }
}
