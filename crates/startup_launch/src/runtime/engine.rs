//! Sequence engine - launches enabled items one at a time, in order

use crate::config::StartupItem;
use crate::notify::Notifier;
use crate::runtime::events::{Completion, EventSink, Progress};
use crate::runtime::strategy::{Launcher, SystemLauncher};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Message sent on the error channel when a run stops early
pub const CANCELLED_MESSAGE: &str = "Execution cancelled by user";

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const CANCEL_REQUESTED: u8 = 2;

/// Run state shared between the run loop and cancel callers.
///
/// A single state word, so "start running" also clears any stale
/// cancellation and a cancel can only land while a run is in flight.
#[derive(Debug, Default)]
pub struct RunState {
    state: AtomicU8,
}

impl RunState {
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::SeqCst) != IDLE
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.state.load(Ordering::SeqCst) == CANCEL_REQUESTED
    }

    fn try_begin(&self) -> bool {
        self.state
            .compare_exchange(IDLE, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn request_cancel(&self) -> bool {
        self.state
            .compare_exchange(
                RUNNING,
                CANCEL_REQUESTED,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    fn finish(&self) {
        self.state.store(IDLE, Ordering::SeqCst);
    }
}

/// Resets the run state on every exit path, unwinding included
struct RunGuard<'a>(&'a RunState);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Cloneable handle that can cancel the engine's current run from anywhere
#[derive(Debug, Clone)]
pub struct CancelHandle {
    state: Arc<RunState>,
}

impl CancelHandle {
    /// Request cancellation of the run in flight.
    ///
    /// Returns `false` when nothing is running. The run stops before its
    /// next item; an in-flight launch or delay is never interrupted.
    pub fn cancel(&self) -> bool {
        let requested = self.state.request_cancel();
        if requested {
            log::info!("Cancelling execution...");
        }
        requested
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every enabled item was attempted
    Completed,
    /// Stopped early at a cancellation checkpoint
    Cancelled,
    /// Rejected because another run was in flight
    Busy,
    /// The orchestration itself failed
    Failed,
}

/// Outcome returned to the caller of [`SequenceEngine::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub status: RunStatus,
    /// Items whose launch was attempted, whether or not it succeeded
    pub executed_count: usize,
    pub message: Option<String>,
}

impl RunResult {
    fn new(status: RunStatus, executed_count: usize) -> Self {
        Self {
            status,
            executed_count,
            message: None,
        }
    }

    fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn success(&self) -> bool {
        matches!(self.status, RunStatus::Completed | RunStatus::Cancelled)
    }
}

/// Launches startup items in sequence with delays, failure isolation and
/// cooperative cancellation
pub struct SequenceEngine {
    launcher: Arc<dyn Launcher>,
    events: Arc<dyn EventSink>,
    notifier: Arc<dyn Notifier>,
    state: Arc<RunState>,
}

impl SequenceEngine {
    pub fn new(
        launcher: Arc<dyn Launcher>,
        events: Arc<dyn EventSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            launcher,
            events,
            notifier,
            state: Arc::new(RunState::default()),
        }
    }

    /// Engine that launches on the local machine
    pub fn with_system_launcher(events: Arc<dyn EventSink>, notifier: Arc<dyn Notifier>) -> Self {
        Self::new(Arc::new(SystemLauncher), events, notifier)
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            state: self.state.clone(),
        }
    }

    /// Request cancellation of the current run, see [`CancelHandle::cancel`]
    pub fn cancel(&self) -> bool {
        self.cancel_handle().cancel()
    }

    /// Run the enabled items of `items` in ascending `order`.
    ///
    /// A call made while another run is in flight returns
    /// [`RunStatus::Busy`] without emitting anything.
    pub async fn run(&self, items: &[StartupItem]) -> RunResult {
        if !self.state.try_begin() {
            log::warn!("Execution already in progress");
            return RunResult::new(RunStatus::Busy, 0).with_message("Already executing");
        }
        let _guard = RunGuard(&self.state);

        // Lives outside the unwind boundary so a failed run still reports its attempts
        let attempted = AtomicUsize::new(0);

        let outcome = AssertUnwindSafe(self.run_sequence(items, &attempted))
            .catch_unwind()
            .await;

        match outcome {
            Ok(result) => result,
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                log::error!("Execution sequence error: {}", reason);
                self.events.on_error(format!("Execution failed: {}", reason));
                let executed = attempted.load(Ordering::SeqCst);
                RunResult::new(RunStatus::Failed, executed).with_message(reason)
            }
        }
    }

    async fn run_sequence(&self, items: &[StartupItem], attempted: &AtomicUsize) -> RunResult {
        let mut enabled: Vec<&StartupItem> = items.iter().filter(|item| item.enabled).collect();
        enabled.sort_by_key(|item| item.order);

        if enabled.is_empty() {
            let message = "No enabled items to execute".to_string();
            self.events.on_progress(Progress::Info(message));
            self.events.on_complete(Completion { executed_count: 0 });
            return RunResult::new(RunStatus::Completed, 0).with_message("No items to execute");
        }

        let total = enabled.len();
        log::info!("Executing {} items...", total);
        self.events.on_progress(Progress::Info(format!(
            "Starting execution of {} items...",
            total
        )));

        let mut cancelled = false;

        for (index, item) in enabled.iter().enumerate() {
            if self.state.is_cancel_requested() {
                log::info!("Cancelled before item {}/{}", index + 1, total);
                self.events.on_error(CANCELLED_MESSAGE.to_string());
                cancelled = true;
                break;
            }

            log::info!("[{}] Executing item {}/{}", item.name, index + 1, total);
            self.events.on_progress(Progress::Item {
                position: index + 1,
                total,
                item_name: item.name.clone(),
                item_kind: item.kind,
            });

            attempted.fetch_add(1, Ordering::SeqCst);
            match self.launcher.launch(item).await {
                Ok(()) => log::info!("[{}] Launched", item.name),
                Err(e) => {
                    log::error!("[{}] Launch failed: {}", item.name, e);
                    let message = format!("Failed to execute \"{}\": {}", item.name, e);
                    self.events.on_error(message.clone());
                    self.notifier.error("Execution Error", &message);
                }
            }

            if index + 1 < total && item.delay_ms > 0 {
                log::debug!(
                    "[{}] Waiting {}ms before next item",
                    item.name,
                    item.delay_ms
                );
                tokio::time::sleep(Duration::from_millis(item.delay_ms)).await;
            }
        }

        let executed = attempted.load(Ordering::SeqCst);
        self.events.on_complete(Completion {
            executed_count: executed,
        });

        if cancelled {
            return RunResult::new(RunStatus::Cancelled, executed).with_message(CANCELLED_MESSAGE);
        }

        self.notifier.success(
            "Execution Complete",
            &format!(
                "Successfully launched {} item{}",
                executed,
                if executed == 1 { "" } else { "s" }
            ),
        );
        RunResult::new(RunStatus::Completed, executed)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected internal error".to_string()
    }
}
