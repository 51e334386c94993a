//! Shared utilities for lifecycle and listener integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use managed_service::config::TimingConfig;
use managed_service::lifecycle::{
    ControlCommand, ControlRequest, ExitReason, LifecycleController, ServiceState, ServiceStatus,
};
use managed_service::net::{ListenerError, ManagedListener, StopOutcome};
use managed_service::observability::EventSink;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// Event sink that keeps every diagnostic in order.
#[derive(Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<(Level, u32, String)>>,
}

impl RecordingSink {
    pub fn entries(&self) -> Vec<(Level, u32, String)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(Level::Error)
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages(Level::Info)
    }

    fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _, _)| *l == level)
            .map(|(_, _, m)| m)
            .collect()
    }

    /// Index of the first message containing `needle`.
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.entries().iter().position(|(_, _, m)| m.contains(needle))
    }
}

impl EventSink for RecordingSink {
    fn info(&self, event_id: u32, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((Level::Info, event_id, message.to_string()));
    }

    fn error(&self, event_id: u32, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((Level::Error, event_id, message.to_string()));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerCall {
    Start,
    Stop(Duration),
}

/// How the scripted listener answers `stop`.
#[derive(Debug, Clone, Copy)]
pub enum StopBehavior {
    Graceful,
    Fail,
    Hang,
}

/// Listener double that records calls instead of binding sockets.
pub struct ScriptedListener {
    calls: Arc<Mutex<Vec<ListenerCall>>>,
    stop: StopBehavior,
}

impl ScriptedListener {
    pub fn new(stop: StopBehavior) -> (Self, Arc<Mutex<Vec<ListenerCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                calls: Arc::clone(&calls),
                stop,
            },
            calls,
        )
    }
}

impl ManagedListener for ScriptedListener {
    fn start(&mut self) -> Result<SocketAddr, ListenerError> {
        self.calls.lock().unwrap().push(ListenerCall::Start);
        Ok(([127, 0, 0, 1], 8080).into())
    }

    fn stop(&mut self, deadline: Duration) -> impl Future<Output = StopOutcome> + Send {
        self.calls.lock().unwrap().push(ListenerCall::Stop(deadline));
        let behavior = self.stop;
        async move {
            match behavior {
                StopBehavior::Graceful => StopOutcome::Graceful,
                StopBehavior::Fail => StopOutcome::Failed("connection reset".into()),
                StopBehavior::Hang => std::future::pending().await,
            }
        }
    }
}

/// A controller running on its own task, with both ends of its channels.
pub struct Harness {
    pub requests: mpsc::Sender<ControlRequest>,
    pub statuses: mpsc::UnboundedReceiver<ServiceStatus>,
    pub sink: Arc<RecordingSink>,
    pub calls: Arc<Mutex<Vec<ListenerCall>>>,
    pub task: JoinHandle<ExitReason>,
}

impl Harness {
    /// Queue requests before the controller starts, then spawn it.
    pub async fn spawn(stop: StopBehavior, queued: &[ControlCommand]) -> Self {
        let (listener, calls) = ScriptedListener::new(stop);
        let sink = Arc::new(RecordingSink::default());
        let controller = LifecycleController::new(
            "svctest1",
            TimingConfig::default(),
            listener,
            sink.clone(),
        );

        let (requests, request_rx) = mpsc::channel(32);
        let (status_tx, statuses) = mpsc::unbounded_channel();
        for command in queued {
            requests.send(ControlRequest::new(*command)).await.unwrap();
        }

        let task = tokio::spawn(controller.run(request_rx, status_tx));
        Self {
            requests,
            statuses,
            sink,
            calls,
            task,
        }
    }

    pub async fn send(&self, command: ControlCommand) {
        self.requests
            .send(ControlRequest::new(command))
            .await
            .unwrap();
    }

    /// Drop the only control sender, as a vanished host would.
    pub fn disconnect(&mut self) {
        self.requests = mpsc::channel(1).0;
    }

    /// Wait for the controller and collect every report it made.
    pub async fn finish(mut self) -> (ExitReason, Vec<ServiceStatus>, Arc<RecordingSink>, Vec<ListenerCall>) {
        let reason = self.task.await.unwrap();
        let mut reports = Vec::new();
        while let Some(status) = self.statuses.recv().await {
            reports.push(status);
        }
        let calls = self.calls.lock().unwrap().clone();
        (reason, reports, self.sink, calls)
    }
}

pub fn states(reports: &[ServiceStatus]) -> Vec<ServiceState> {
    reports.iter().map(|s| s.state).collect()
}
