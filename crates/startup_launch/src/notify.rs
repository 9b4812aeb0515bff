//! Human-facing notifications for run summaries and item failures

use std::fmt;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tokio::runtime::Handle;

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "INFO",
            Severity::Success => "SUCCESS",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Receiver of notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, severity: Severity, title: &str, body: &str);

    fn success(&self, title: &str, body: &str) {
        self.notify(Severity::Success, title, body);
    }

    fn error(&self, title: &str, body: &str) {
        self.notify(Severity::Error, title, body);
    }
}

/// Writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, severity: Severity, title: &str, body: &str) {
        match severity {
            Severity::Error => log::error!("[{}] {}: {}", severity, title, body),
            Severity::Warning => log::warn!("[{}] {}: {}", severity, title, body),
            Severity::Info | Severity::Success => {
                log::info!("[{}] {}: {}", severity, title, body)
            }
        }
    }
}

/// Desktop notifications through `notify-send`.
///
/// Delivery runs on the tokio runtime and waits for `notify-send` to exit.
/// A failed spawn or a non-zero exit (no notification daemon yet, common
/// right after login) hands the notification to the fallback notifier.
#[derive(Clone)]
pub struct DesktopNotifier {
    app_name: String,
    program: String,
    fallback: Arc<dyn Notifier>,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            program: "notify-send".to_string(),
            fallback: Arc::new(LogNotifier),
        }
    }

    /// Use a different notification command with `notify-send` compatible flags
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Notifier used when the desktop notification cannot be shown
    pub fn with_fallback(mut self, fallback: Arc<dyn Notifier>) -> Self {
        self.fallback = fallback;
        self
    }

    fn urgency(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => "critical",
            Severity::Warning => "normal",
            Severity::Info | Severity::Success => "low",
        }
    }

    /// Show a notification and wait for the command to finish.
    ///
    /// Returns `false` when it was handed to the fallback instead.
    pub async fn deliver(&self, severity: Severity, title: &str, body: &str) -> bool {
        let status = Command::new(&self.program)
            .arg("--app-name")
            .arg(&self.app_name)
            .arg("--urgency")
            .arg(Self::urgency(severity))
            .arg(title)
            .arg(body)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => return true,
            Ok(status) => log::debug!("{} exited with {}", self.program, status),
            Err(e) => log::debug!("{} unavailable: {}", self.program, e),
        }
        self.fallback.notify(severity, title, body);
        false
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, severity: Severity, title: &str, body: &str) {
        let Ok(runtime) = Handle::try_current() else {
            self.fallback.notify(severity, title, body);
            return;
        };

        let notifier = self.clone();
        let title = title.to_string();
        let body = body.to_string();
        runtime.spawn(async move {
            notifier.deliver(severity, &title, &body).await;
        });
    }
}
