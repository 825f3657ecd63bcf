//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Sequential headless-browser Mocha test runner
#[derive(Parser, Debug)]
#[command(name = "mocha-batch")]
#[command(author = "hephaex@gmail.com")]
#[command(version)]
#[command(about = "Run Mocha test pages in headless Chrome and report one verdict")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a batch of test pages
    Run(RunArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Test page files, run after any URLs
    pub files: Vec<String>,

    /// Explicit test page URL (repeatable)
    #[arg(short, long = "url")]
    pub urls: Vec<String>,

    /// Mocha reporter
    #[arg(short, long)]
    pub reporter: Option<String>,

    /// Runner limit for one page in milliseconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Abort the batch on the first failure
    #[arg(short, long)]
    pub bail: bool,

    /// Forward page console output to the log
    #[arg(long)]
    pub log: bool,

    /// Report page script errors as errors
    #[arg(long)]
    pub log_errors: bool,

    /// Do not notify when the batch passes
    #[arg(long)]
    pub no_growl_on_success: bool,

    /// File receiving reporter output
    #[arg(short, long)]
    pub dest: Option<String>,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Headless runner command
    #[arg(long)]
    pub engine: Option<String>,

    /// Output format (table, json, json-pretty, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Save the verdict as JSON
    #[arg(long)]
    pub report: Option<String>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "./mocha-batch.yaml")]
        output: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the resolved configuration
    Show {
        /// Show environment overrides instead
        #[arg(short, long)]
        env: bool,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Validate a configuration file
    Validate {
        /// File to validate (default: first standard location)
        file: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args() {
        let args = Args::parse_from([
            "mocha-batch",
            "run",
            "test/a.html",
            "test/b.html",
            "--url",
            "http://localhost:8000/c.html",
            "--bail",
            "--reporter",
            "dot",
            "--dest",
            "out.txt",
        ]);
        match args.command {
            Command::Run(run) => {
                assert_eq!(run.files, vec!["test/a.html", "test/b.html"]);
                assert_eq!(run.urls, vec!["http://localhost:8000/c.html"]);
                assert!(run.bail);
                assert_eq!(run.reporter.as_deref(), Some("dot"));
                assert_eq!(run.dest.as_deref(), Some("out.txt"));
                assert_eq!(run.format, "table");
                assert!(!run.no_growl_on_success);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_config_args() {
        let args = Args::parse_from(["mocha-batch", "-v", "config", "init", "--force"]);
        assert!(args.verbose);
        match args.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { output, force },
            }) => {
                assert_eq!(output, "./mocha-batch.yaml");
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
