//! Test helpers for engine scenario tests

#![allow(dead_code)]

use async_trait::async_trait;
use startup_launch::{
    ChannelSink, EngineEvent, LaunchError, Launcher, Notifier, SequenceEngine, Severity,
    StartupItem,
};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Notify};

/// Launcher that parks inside `launch` until released
#[derive(Default)]
pub struct GateLauncher {
    pub launched: Mutex<Vec<String>>,
    pub entered: Notify,
    pub release: Notify,
    pub gated: Mutex<Vec<String>>,
}

impl GateLauncher {
    /// Park launches of the given ids until `release` is notified
    pub fn gating(ids: &[&str]) -> Self {
        Self {
            gated: Mutex::new(ids.iter().map(|id| id.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn launched(&self) -> Vec<String> {
        self.launched.lock().unwrap().clone()
    }
}

#[async_trait]
impl Launcher for GateLauncher {
    async fn launch(&self, item: &StartupItem) -> Result<(), LaunchError> {
        self.launched.lock().unwrap().push(item.id.clone());

        let gated = self.gated.lock().unwrap().contains(&item.id);
        if gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
        Ok(())
    }
}

/// Notifier that records what it was asked to show
#[derive(Default)]
pub struct RecordingNotifier(pub Mutex<Vec<(Severity, String, String)>>);

impl Notifier for RecordingNotifier {
    fn notify(&self, severity: Severity, title: &str, body: &str) {
        self.0
            .lock()
            .unwrap()
            .push((severity, title.to_string(), body.to_string()));
    }
}

pub struct Harness<L> {
    pub engine: Arc<SequenceEngine>,
    pub launcher: Arc<L>,
    pub notes: Arc<RecordingNotifier>,
    pub events: mpsc::UnboundedReceiver<EngineEvent>,
}

pub fn harness<L: Launcher + 'static>(launcher: L) -> Harness<L> {
    let launcher = Arc::new(launcher);
    let notes = Arc::new(RecordingNotifier::default());
    let (sink, events) = ChannelSink::new();
    let engine = SequenceEngine::new(launcher.clone(), Arc::new(sink), notes.clone());
    Harness {
        engine: Arc::new(engine),
        launcher,
        notes,
        events,
    }
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn exe(id: &str, order: u32) -> StartupItem {
    StartupItem::executable(id.to_uppercase(), format!("/usr/bin/{}", id))
        .with_id(id)
        .with_order(order)
}
