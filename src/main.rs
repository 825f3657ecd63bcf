//! mocha-batch - Headless Mocha test batch runner
//!
//! Runs a list of Mocha test pages one after another in headless Chrome,
//! sums their results and reports a single pass/fail verdict for build
//! pipelines.
//!
//! ## Usage
//!
//! ```bash
//! # Run test pages
//! mocha-batch run test/index.html test/other.html
//!
//! # Explicit URLs are tested before files
//! mocha-batch run --url http://localhost:8000/test/index.html
//!
//! # Stop at the first page that errors, keep the reporter output
//! mocha-batch run test/*.html --bail --reporter xunit --dest reports/xunit.xml
//!
//! # Create a configuration file
//! mocha-batch config init
//! ```

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{debug, info};

mod cli;
mod config;
mod executor;
mod models;
mod notify;
mod output;
mod utils;

use cli::Args;
use config::{ConfigFile, EngineConfig, EnvConfig, MochaOptions};
use executor::{BatchOrchestrator, HeadlessChromeEngine, TargetRunner};
use models::{BatchVerdict, TestTarget};
use output::{Console, FsStore, OutputFormat, ResultFormatter};
use utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    init_logger(LogLevel::resolve(args.verbose, env.log_level.as_deref()));

    match args.command {
        cli::Command::Run(run_args) => {
            let verdict = run_batch(run_args, &env).await?;
            if verdict.is_hard_failure() {
                anyhow::bail!("{}", verdict.summary());
            }
            if !verdict.succeeded {
                std::process::exit(1);
            }
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, &env)?;
        }
    }

    Ok(())
}

/// Merge defaults, config file, environment and command line
fn resolve_options(
    args: &cli::RunArgs,
    env: &EnvConfig,
) -> Result<(MochaOptions, EngineConfig)> {
    let config_path = args.config.as_deref().or(env.config_file.as_deref());
    let file = ConfigFile::resolve(config_path)?;

    let mut options = file.options;
    let mut engine = file.engine;

    options.apply_env(env);
    if let Some(command) = &env.engine {
        engine.command = command.clone();
    }
    if let Some(timeout) = env.timeout {
        engine.run_timeout_ms = timeout;
    }

    if let Some(reporter) = &args.reporter {
        options.reporter = reporter.clone();
    }
    if let Some(timeout) = args.timeout {
        engine.run_timeout_ms = timeout;
    }
    if args.bail {
        options.bail = true;
    }
    if args.log {
        options.log = true;
    }
    if args.log_errors {
        options.log_errors = true;
    }
    if args.no_growl_on_success {
        options.growl_on_success = false;
    }
    if let Some(dest) = &args.dest {
        options.reporter_options.output = Some(PathBuf::from(dest));
    }
    options.urls.extend(args.urls.iter().cloned());
    if let Some(command) = &args.engine {
        engine.command = command.clone();
    }

    Ok((options, engine))
}

async fn run_batch(args: cli::RunArgs, env: &EnvConfig) -> Result<BatchVerdict> {
    let (options, engine_config) = resolve_options(&args, env)?;
    debug!("Options: {}", serde_json::to_string_pretty(&options)?);
    debug!("Engine: {}", serde_json::to_string_pretty(&engine_config)?);

    let targets = TestTarget::merge(options.urls.iter().cloned(), args.files.iter().cloned());
    let mut formatter = ResultFormatter::new(
        OutputFormat::from_str(&args.format).unwrap_or(OutputFormat::Table),
    );
    if !std::io::stdout().is_terminal() {
        formatter = formatter.no_color();
    }

    let console = Console::stdout();
    let notifier = notify::detect();
    info!("Notifications: {}", notifier.name());

    let engine = HeadlessChromeEngine::new(&engine_config, console.clone())
        .with_console_log(options.log)
        .with_error_log(options.log_errors);
    let runner = TargetRunner::new(engine, &options, &engine_config);

    let mut orchestrator = BatchOrchestrator::new(runner, console.clone(), Box::new(FsStore), notifier)
        .with_dest(options.dest().cloned())
        .with_bail(options.bail)
        .with_notify_on_success(options.growl_on_success);

    let verdict = orchestrator.run(&targets).await;
    debug!("Batch {}", orchestrator.state());

    console.println(formatter.format_verdict(&verdict));
    if let Some(path) = &args.report {
        output::write_report(path, &verdict)?;
        info!("Verdict saved to {}", path);
    }

    Ok(verdict)
}

fn manage_config(args: cli::ConfigArgs, env: &EnvConfig) -> Result<()> {
    use std::path::Path;

    match args.action {
        cli::ConfigAction::Init { output, force } => {
            let path = Path::new(&output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            let config = ConfigFile::example();
            config.save(path)?;
            println!("✓ Configuration file created: {output}");
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Show { env: show_env, format } => {
            if show_env {
                env.print_summary();
                if !env.has_any() {
                    println!();
                    config::print_env_help();
                }
            } else {
                let config = ConfigFile::resolve(env.config_file.as_deref())?;
                let output = if format == "json" {
                    serde_json::to_string_pretty(&config)?
                } else {
                    serde_yaml::to_string(&config)?
                };
                println!("{output}");
            }
        }

        cli::ConfigAction::Validate { file } => {
            let path = file
                .or_else(|| env.config_file.clone())
                .or_else(|| ConfigFile::find().map(|p| p.to_string_lossy().to_string()))
                .unwrap_or_else(|| "./mocha-batch.yaml".to_string());

            match ConfigFile::load(&path) {
                Ok(_) => {
                    println!("✓ Configuration file is valid: {path}");
                }
                Err(e) => {
                    println!("✗ Configuration file is invalid: {path}");
                    println!("  Error: {e:#}");
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}
