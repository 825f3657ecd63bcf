//! Desktop notifications
//!
//! Best-effort delivery of the batch outcome. A notifier is picked once at
//! startup; when no notification command is installed a no-op stands in.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Growl-style priority used for every outcome
pub const DEFAULT_PRIORITY: i32 = 3;

/// Icon shown with a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifyIcon {
    Ok,
    Error,
}

impl NotifyIcon {
    /// Bundled image asset
    pub fn asset(&self) -> PathBuf {
        let file = match self {
            NotifyIcon::Ok => "ok.png",
            NotifyIcon::Error => "error.png",
        };
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("assets")
            .join("notify")
            .join(file)
    }

    /// Freedesktop icon theme name
    pub fn theme_name(&self) -> &'static str {
        match self {
            NotifyIcon::Ok => "dialog-information",
            NotifyIcon::Error => "dialog-error",
        }
    }
}

/// One outcome notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub icon: NotifyIcon,
    pub title: String,
    pub priority: i32,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            title: message.clone(),
            message,
            icon: NotifyIcon::Ok,
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            title: message.clone(),
            message,
            icon: NotifyIcon::Error,
            priority: DEFAULT_PRIORITY,
        }
    }
}

/// Notification sink. Delivery never fails the caller.
pub trait Notifier {
    fn notify(&self, notification: &Notification);

    fn name(&self) -> &'static str;
}

/// Notifier that drops everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, notification: &Notification) {
        debug!("Notification skipped: {}", notification.message);
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Supported notification commands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifyBackend {
    Growl,
    NotifySend,
}

impl NotifyBackend {
    pub fn program(&self) -> &'static str {
        match self {
            NotifyBackend::Growl => "growlnotify",
            NotifyBackend::NotifySend => "notify-send",
        }
    }

    pub fn all() -> Vec<NotifyBackend> {
        vec![NotifyBackend::Growl, NotifyBackend::NotifySend]
    }
}

/// Notifier spawning an installed notification command
#[derive(Clone, Debug)]
pub struct CommandNotifier {
    backend: NotifyBackend,
    program: PathBuf,
}

impl CommandNotifier {
    pub fn new(backend: NotifyBackend, program: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            program: program.into(),
        }
    }

    /// Arguments for one notification
    pub fn args(&self, notification: &Notification) -> Vec<String> {
        match self.backend {
            NotifyBackend::Growl => {
                let mut args = vec![
                    "-t".to_string(),
                    notification.title.clone(),
                    "-m".to_string(),
                    notification.message.clone(),
                    "-p".to_string(),
                    notification.priority.to_string(),
                ];
                let image = notification.icon.asset();
                if image.is_file() {
                    args.push("--image".to_string());
                    args.push(image.display().to_string());
                }
                args
            }
            NotifyBackend::NotifySend => vec![
                "-i".to_string(),
                notification.icon.theme_name().to_string(),
                "-u".to_string(),
                urgency(notification.priority).to_string(),
                notification.title.clone(),
                notification.message.clone(),
            ],
        }
    }
}

impl Notifier for CommandNotifier {
    fn notify(&self, notification: &Notification) {
        let spawned = Command::new(&self.program)
            .args(self.args(notification))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            // Reap in the background so a slow daemon never holds up the batch
            Ok(mut child) => {
                std::thread::spawn(move || child.wait());
            }
            Err(e) => debug!("Notification via {} failed: {}", self.backend.program(), e),
        }
    }

    fn name(&self) -> &'static str {
        self.backend.program()
    }
}

fn urgency(priority: i32) -> &'static str {
    match priority {
        p if p >= 2 => "critical",
        p if p >= 0 => "normal",
        _ => "low",
    }
}

/// Find an executable on `PATH`
fn find_in_path(program: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Pick the notifier for this process
pub fn detect() -> Box<dyn Notifier> {
    for backend in NotifyBackend::all() {
        if let Some(program) = find_in_path(backend.program()) {
            debug!("Using {} for notifications", program.display());
            return Box::new(CommandNotifier::new(backend, program));
        }
    }
    debug!("No notification command found, install growlnotify or notify-send for notifications");
    Box::new(NoopNotifier)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Notifier remembering what it was asked to deliver
    #[derive(Clone, Default)]
    pub struct RecordingNotifier(Arc<Mutex<Vec<Notification>>>);

    impl RecordingNotifier {
        pub fn sent(&self) -> Vec<Notification> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: &Notification) {
            self.0.lock().unwrap().push(notification.clone());
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }
}
