//! Headless browser engine
//!
//! Runs one test page in a headless Chrome through the
//! `mocha-headless-chrome` command-line runner and collects its stats.

use serde::Deserialize;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info, warn, Level};

use crate::config::EngineConfig;
use crate::models::{MochaStats, TestTarget};
use crate::output::Console;

/// Engine failures
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("test page did not finish within {0}ms")]
    Timeout(u64),

    #[error("engine I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("engine exited ({status}) without producing a result")]
    NoResult { status: String },

    #[error("engine produced an unreadable result: {0}")]
    InvalidResult(#[from] serde_json::Error),

    #[error("{0}")]
    Rejected(String),
}

/// Everything the engine needs to run one page
#[derive(Clone, Debug, PartialEq)]
pub struct EngineRequest {
    pub target: TestTarget,
    pub reporter: String,
    pub width: u32,
    pub height: u32,
    pub visible: bool,
    pub args: Vec<String>,
    pub executable_path: Option<String>,
    /// Destination handed to reporters that can write it themselves
    pub reporter_output: Option<PathBuf>,
}

/// Structured result of one page run
#[derive(Clone, Debug)]
pub struct EngineReport {
    pub stats: MochaStats,
    pub exit_code: Option<i32>,
}

/// The external execution engine
pub trait TestEngine {
    fn run(
        &self,
        request: &EngineRequest,
    ) -> impl Future<Output = Result<EngineReport, EngineError>> + Send;
}

#[derive(Deserialize)]
struct RunnerOutput {
    result: RunnerResult,
}

#[derive(Deserialize)]
struct RunnerResult {
    stats: MochaStats,
}

/// Read `reader` line by line, replacing invalid UTF-8
async fn for_each_line<R, F>(reader: R, mut on_line: F) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let mut segments = BufReader::new(reader).split(b'\n');
    while let Some(segment) = segments.next_segment().await? {
        let line = String::from_utf8_lossy(&segment);
        let line: &str = &line;
        on_line(line.strip_suffix('\r').unwrap_or(line));
    }
    Ok(())
}

/// Engine backed by the `mocha-headless-chrome` CLI
pub struct HeadlessChromeEngine {
    command: String,
    command_prefix: Vec<String>,
    run_timeout: Duration,
    reporter_output_flag: Option<String>,
    console: Console,
    log_console: bool,
    log_errors: bool,
}

impl HeadlessChromeEngine {
    pub fn new(config: &EngineConfig, console: Console) -> Self {
        Self {
            command: config.command.clone(),
            command_prefix: config.command_prefix.clone(),
            run_timeout: Duration::from_millis(config.run_timeout_ms),
            reporter_output_flag: config.reporter_output_flag.clone(),
            console,
            log_console: false,
            log_errors: false,
        }
    }

    /// Forward the page's stderr to the log at info level
    pub fn with_console_log(mut self, enabled: bool) -> Self {
        self.log_console = enabled;
        self
    }

    /// Report the page's stderr as errors
    pub fn with_error_log(mut self, enabled: bool) -> Self {
        self.log_errors = enabled;
        self
    }

    /// Command-line arguments for one run.
    ///
    /// `-t` is the runner's limit for the whole page, the same one enforced
    /// around the child process.
    pub fn command_args(&self, request: &EngineRequest, result_path: &Path) -> Vec<String> {
        let mut args = self.command_prefix.clone();
        args.extend([
            "-f".to_string(),
            request.target.locator().to_string(),
            "-r".to_string(),
            request.reporter.clone(),
            "-t".to_string(),
            self.run_timeout.as_millis().to_string(),
            "-w".to_string(),
            request.width.to_string(),
            "-H".to_string(),
            request.height.to_string(),
            "-o".to_string(),
            result_path.display().to_string(),
        ]);

        for arg in &request.args {
            args.push("-a".to_string());
            args.push(arg.clone());
        }
        if request.visible {
            args.push("-v".to_string());
        }
        if let Some(path) = &request.executable_path {
            args.push("-e".to_string());
            args.push(path.clone());
        }
        if let (Some(flag), Some(dest)) = (&self.reporter_output_flag, &request.reporter_output) {
            args.push(flag.clone());
            args.push(dest.display().to_string());
        }

        args
    }

    /// Level the page's stderr is logged at
    pub fn stderr_level(&self) -> Level {
        if self.log_errors {
            Level::ERROR
        } else if self.log_console {
            Level::INFO
        } else {
            Level::DEBUG
        }
    }

    fn forward_stderr(&self, line: &str) {
        let level = self.stderr_level();
        if level == Level::ERROR {
            error!("{}", line);
        } else if level == Level::INFO {
            info!("{}", line);
        } else {
            debug!("{}", line);
        }
    }

    async fn drive(&self, command: &mut Command) -> Result<ExitStatus, EngineError> {
        let mut child = command.spawn().map_err(|source| EngineError::Spawn {
            command: self.command.clone(),
            source,
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let pump_stdout = async {
            match stdout {
                Some(stdout) => for_each_line(stdout, |line| self.console.println(line)).await,
                None => Ok(()),
            }
        };
        let pump_stderr = async {
            match stderr {
                Some(stderr) => for_each_line(stderr, |line| self.forward_stderr(line)).await,
                None => Ok(()),
            }
        };

        let waited = tokio::time::timeout(self.run_timeout, async {
            let (out, err) = futures::future::join(pump_stdout, pump_stderr).await;
            // The result file decides the run, a broken pipe only loses output
            if let Err(e) = out {
                warn!("Engine stdout ended early: {}", e);
            }
            if let Err(e) = err {
                warn!("Engine stderr ended early: {}", e);
            }
            child.wait().await
        })
        .await;

        match waited {
            Ok(status) => Ok(status?),
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill timed out engine: {}", e);
                }
                Err(EngineError::Timeout(self.run_timeout.as_millis() as u64))
            }
        }
    }
}

impl TestEngine for HeadlessChromeEngine {
    async fn run(&self, request: &EngineRequest) -> Result<EngineReport, EngineError> {
        let target = &request.target;
        if !target.is_url() && !Path::new(target.locator()).exists() {
            return Err(EngineError::Rejected(format!(
                "test page not found: {}",
                target.locator()
            )));
        }

        let result_file = tempfile::Builder::new()
            .prefix("mocha-batch-")
            .suffix(".json")
            .tempfile()?;
        let result_path = result_file.path().to_path_buf();

        let args = self.command_args(request, &result_path);
        debug!("{} {}", self.command, args.join(" "));

        let mut command = Command::new(&self.command);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let status = self.drive(&mut command).await?;

        // mocha exits non-zero when tests fail, so the status alone decides nothing
        let raw = tokio::fs::read_to_string(&result_path).await?;
        if raw.trim().is_empty() {
            return Err(EngineError::NoResult {
                status: status.to_string(),
            });
        }

        let output: RunnerOutput = serde_json::from_str(&raw)?;
        Ok(EngineReport {
            stats: output.result.stats,
            exit_code: status.code(),
        })
    }
}
