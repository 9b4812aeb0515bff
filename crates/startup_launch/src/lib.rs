//! Startup Launch
//!
//! Runs an ordered list of startup actions (programs, scripts, URLs) one
//! after another, typically right after login.
//!
//! # Overview
//!
//! - Items are launched strictly in ascending `order`, one at a time
//! - Each item may ask for a pause before the next one starts
//! - A failing item is reported and the sequence carries on
//! - A run can be cancelled; it stops before the next item
//! - Launched programs are detached and never waited for
//!
//! # Example Config
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "autoRunOnStartup": true,
//!   "loginDelayMs": 3000,
//!   "items": [
//!     { "id": "7f0c...", "name": "Mail", "type": "url",
//!       "target": "https://mail.example.com", "delayMs": 0, "enabled": true, "order": 0 },
//!     { "id": "19ab...", "name": "Sync", "type": "script", "target": "~/bin/sync.py",
//!       "scriptInterpreter": "python", "args": "--quiet", "delayMs": 2000,
//!       "enabled": true, "order": 1 }
//!   ]
//! }
//! ```

pub mod autostart;
pub mod cli;
pub mod config;
pub mod notify;
pub mod runtime;

pub use autostart::{Autostart, AutostartError};
pub use cli::{CliError, LaunchArgs};
pub use config::{ConfigError, ItemKind, ScriptInterpreter, StartupConfig, StartupItem};
pub use notify::{DesktopNotifier, LogNotifier, Notifier, Severity};
pub use runtime::{
    CancelHandle, ChannelSink, Completion, EngineEvent, EventSink, LaunchCommand, LaunchError,
    Launcher, LogSink, Progress, RunResult, RunStatus, SequenceEngine, SystemLauncher,
};
