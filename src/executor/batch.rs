//! Batch orchestration
//!
//! Drives a batch of targets one at a time, collects their stats, handles
//! captured output and reports a single verdict.

use chrono::Utc;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use super::engine::TestEngine;
use super::runner::TargetRunner;
use crate::models::{AggregateStats, BatchVerdict, TargetError, TestTarget};
use crate::notify::{Notification, Notifier};
use crate::output::{CapturePolicy, CaptureSession, Console, OutputStore};

/// Where a batch is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    Invoking(usize),
    Recorded(usize),
    Finalizing,
    Done { succeeded: bool },
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchState::Idle => write!(f, "idle"),
            BatchState::Running => write!(f, "running"),
            BatchState::Invoking(i) => write!(f, "invoking #{}", i + 1),
            BatchState::Recorded(i) => write!(f, "recorded #{}", i + 1),
            BatchState::Finalizing => write!(f, "finalizing"),
            BatchState::Done { succeeded } => {
                write!(f, "done ({})", if *succeeded { "success" } else { "failure" })
            }
        }
    }
}

/// Sequential batch runner
pub struct BatchOrchestrator<E> {
    runner: TargetRunner<E>,
    console: Console,
    store: Box<dyn OutputStore>,
    notifier: Box<dyn Notifier>,
    dest: Option<PathBuf>,
    bail: bool,
    notify_on_success: bool,
    state: BatchState,
}

impl<E: TestEngine> BatchOrchestrator<E> {
    pub fn new(
        runner: TargetRunner<E>,
        console: Console,
        store: Box<dyn OutputStore>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            runner,
            console,
            store,
            notifier,
            dest: None,
            bail: false,
            notify_on_success: true,
            state: BatchState::Idle,
        }
    }

    /// Destination for captured output
    pub fn with_dest(mut self, dest: Option<PathBuf>) -> Self {
        self.dest = dest;
        self
    }

    /// Abort on the first execution error
    pub fn with_bail(mut self, bail: bool) -> Self {
        self.bail = bail;
        self
    }

    pub fn with_notify_on_success(mut self, enabled: bool) -> Self {
        self.notify_on_success = enabled;
        self
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    fn transition(&mut self, next: BatchState) {
        debug!("Batch {} -> {}", self.state, next);
        self.state = next;
    }

    fn start_capture(&self) -> Option<CaptureSession> {
        let dest = self.dest.as_ref()?;
        CapturePolicy::prepare(self.store.as_ref(), dest);

        match self.console.capture() {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Captured output will not be written to {}: {}", dest.display(), e);
                None
            }
        }
    }

    fn finish_capture(&self, session: Option<CaptureSession>) {
        if let (Some(session), Some(dest)) = (session, self.dest.as_ref()) {
            let lines = session.finish();
            CapturePolicy::persist(self.store.as_ref(), dest, &lines);
        }
    }

    /// Run every target in order and decide the verdict
    pub async fn run(&mut self, targets: &[TestTarget]) -> BatchVerdict {
        let started_at = Utc::now();
        self.transition(BatchState::Running);
        info!("Running {} test target(s)", targets.len());

        // Dropping the session on any exit path restores plain output
        let capture = self.start_capture();

        let mut collected = Vec::with_capacity(targets.len());
        let mut errors = Vec::new();
        let mut aborted = None;
        let mut attempted = 0;

        for (index, target) in targets.iter().enumerate() {
            self.transition(BatchState::Invoking(index));
            attempted += 1;

            let outcome = self.runner.run_target(target).await;
            self.transition(BatchState::Recorded(index));

            match outcome {
                Ok(stats) => {
                    let symbol = if stats.failures == 0 { "✓" } else { "✗" };
                    info!("  {} {} - {}", symbol, target, stats);
                    collected.push(stats);
                }
                Err(e) => {
                    errors.push(TargetError {
                        target: e.target().clone(),
                        message: e.to_string(),
                    });

                    if self.bail {
                        error!("Aborting remaining targets: {}", e);
                        aborted = Some(e.to_string());
                        break;
                    }
                    error!("{}", e);
                }
            }
        }

        self.transition(BatchState::Finalizing);
        self.finish_capture(capture);

        let skipped = targets.len() - attempted;
        if skipped > 0 {
            warn!("{} target(s) not run", skipped);
        }

        let aggregate = AggregateStats::reduce(&collected);
        let verdict =
            BatchVerdict::decide(aggregate, self.bail, aborted, attempted, errors, started_at);
        self.report(&verdict);

        self.transition(BatchState::Done {
            succeeded: verdict.succeeded,
        });
        verdict
    }

    fn report(&self, verdict: &BatchVerdict) {
        let message = verdict.summary();

        if verdict.succeeded {
            if self.notify_on_success {
                self.notifier.notify(&Notification::success(&message));
            }
            info!("{}", message);
        } else {
            self.notifier.notify(&Notification::failure(&message));
            if verdict.is_hard_failure() {
                error!("Batch failed: {}", message);
            } else {
                error!("{}", message);
            }
        }
    }
}
