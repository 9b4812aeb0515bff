//! Events emitted by the sequence engine and the sinks that receive them

use crate::config::ItemKind;
use std::fmt;
use tokio::sync::mpsc;

/// Progress update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Free-form status line ("Starting execution of 3 items...")
    Info(String),
    /// Emitted right before an item's launch is attempted
    Item {
        position: usize,
        total: usize,
        item_name: String,
        item_kind: ItemKind,
    },
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::Info(message) => f.write_str(message),
            Progress::Item {
                position,
                total,
                item_name,
                item_kind,
            } => write!(f, "[{}/{}] {} ({})", position, total, item_name, item_kind),
        }
    }
}

/// End-of-run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// Items whose launch was attempted, failed ones included
    pub executed_count: usize,
}

/// Any engine output, in the order it was emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress(Progress),
    Complete(Completion),
    Error(String),
}

/// Receiver of engine events.
///
/// Called synchronously from the run loop, so implementations should hand
/// the event off quickly.
pub trait EventSink: Send + Sync {
    fn on_progress(&self, progress: Progress);
    fn on_complete(&self, completion: Completion);
    fn on_error(&self, message: String);
}

/// Forwards events into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: EngineEvent) {
        // A dropped receiver only means nobody is watching anymore
        let _ = self.tx.send(event);
    }
}

impl EventSink for ChannelSink {
    fn on_progress(&self, progress: Progress) {
        self.send(EngineEvent::Progress(progress));
    }

    fn on_complete(&self, completion: Completion) {
        self.send(EngineEvent::Complete(completion));
    }

    fn on_error(&self, message: String) {
        self.send(EngineEvent::Error(message));
    }
}

/// Writes events to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn on_progress(&self, progress: Progress) {
        log::info!("{}", progress);
    }

    fn on_complete(&self, completion: Completion) {
        log::info!(
            "Execution complete: {} item(s) attempted",
            completion.executed_count
        );
    }

    fn on_error(&self, message: String) {
        log::error!("{}", message);
    }
}
