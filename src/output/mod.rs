//! Output handling module
//!
//! The shared output channel with its capture tee, the captured-output
//! destination, and verdict formatting.

pub mod console;
mod destination;
mod formatter;

pub use console::{CaptureError, CaptureSession, Console};
pub use destination::{CapturePolicy, FsStore, MemoryStore, OutputStore, Persisted};
pub use formatter::{write_report, OutputFormat, ResultFormatter};
