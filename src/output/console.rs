//! Shared textual output channel
//!
//! Everything a batch prints, including the engine's reporter output, goes
//! through one [`Console`]. While a [`CaptureSession`] is alive every line is
//! passed through to the sink unchanged and also kept in a buffer.

#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CaptureError {
    #[error("output capture is already active")]
    AlreadyActive,
}

struct ConsoleState {
    sink: Box<dyn Write + Send>,
    capture: Option<Vec<String>>,
}

/// Handle on the process-wide output channel
#[derive(Clone)]
pub struct Console {
    state: Arc<Mutex<ConsoleState>>,
}

impl Console {
    /// Console writing to standard output
    pub fn stdout() -> Self {
        Self::with_sink(io::stdout())
    }

    /// Console writing to an arbitrary sink
    pub fn with_sink(sink: impl Write + Send + 'static) -> Self {
        Self {
            state: Arc::new(Mutex::new(ConsoleState {
                sink: Box::new(sink),
                capture: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConsoleState> {
        // A panic while holding the lock leaves the state usable
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write one line
    pub fn println(&self, line: impl AsRef<str>) {
        let line = line.as_ref();
        let mut state = self.lock();

        if let Err(e) = writeln!(state.sink, "{line}").and_then(|_| state.sink.flush()) {
            warn!("Failed to write output line: {}", e);
        }
        if let Some(buffer) = state.capture.as_mut() {
            buffer.push(line.to_string());
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.lock().capture.is_some()
    }

    /// Start teeing output into a buffer.
    ///
    /// Only one session may be active at a time.
    pub fn capture(&self) -> Result<CaptureSession, CaptureError> {
        let mut state = self.lock();
        if state.capture.is_some() {
            return Err(CaptureError::AlreadyActive);
        }
        state.capture = Some(Vec::new());
        debug!("Output capture started");

        Ok(CaptureSession {
            console: self.clone(),
            released: false,
        })
    }

    fn release(&self) -> Vec<String> {
        let lines = self.lock().capture.take().unwrap_or_default();
        debug!("Output capture released ({} lines)", lines.len());
        lines
    }
}

/// Active capture. Dropping it restores plain passthrough.
pub struct CaptureSession {
    console: Console,
    released: bool,
}

impl CaptureSession {
    /// Stop capturing and take the buffered lines in emission order
    pub fn finish(mut self) -> Vec<String> {
        self.released = true;
        self.console.release()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if !self.released {
            self.console.release();
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::SharedSink;
    use super::*;

    #[test]
    fn test_passthrough_without_capture() {
        let sink = SharedSink::default();
        let console = Console::with_sink(sink.clone());

        console.println("hello");
        assert_eq!(sink.contents(), "hello\n");
        assert!(!console.is_capturing());
    }

    #[test]
    fn test_capture_tees_lines() {
        let sink = SharedSink::default();
        let console = Console::with_sink(sink.clone());

        console.println("before");
        let session = console.capture().unwrap();
        console.println("first");
        console.clone().println("second");
        let lines = session.finish();
        console.println("after");

        assert_eq!(lines, vec!["first", "second"]);
        assert_eq!(sink.contents(), "before\nfirst\nsecond\nafter\n");
        assert!(!console.is_capturing());
    }

    #[test]
    fn test_only_one_capture_at_a_time() {
        let console = Console::with_sink(SharedSink::default());
        let session = console.capture().unwrap();

        assert_eq!(console.capture().err(), Some(CaptureError::AlreadyActive));

        drop(session);
        assert!(console.capture().is_ok());
    }

    #[test]
    fn test_drop_releases_capture() {
        let console = Console::with_sink(SharedSink::default());
        {
            let _session = console.capture().unwrap();
            console.println("lost");
            assert!(console.is_capturing());
        }
        assert!(!console.is_capturing());

        let session = console.capture().unwrap();
        assert!(session.finish().is_empty());
    }
}
