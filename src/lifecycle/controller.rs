//! Lifecycle controller: the service control state machine.
//!
//! One task owns the service state. It waits on the union of the uptime
//! deadline, the inbound control channel and the liveness ticker, handles
//! exactly one event per iteration, and reports every transition on the
//! outbound channel in the order it happens.

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::TimingConfig;
use crate::lifecycle::control::{ControlCommand, ControlRequest};
use crate::lifecycle::state::{ServiceState, ServiceStatus};
use crate::net::listener::{ManagedListener, StopOutcome};
use crate::observability::events::{EventSink, LIFECYCLE_EVENT, LISTENER_EVENT};

/// Why the control loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Stop,
    Shutdown,
    PreShutdown,
    /// The maximum uptime elapsed.
    UptimeElapsed,
    /// The host dropped the control channel.
    HostDisconnected,
}

/// Owns the service state and the managed listener for one run.
pub struct LifecycleController<L> {
    name: String,
    timings: TimingConfig,
    listener: L,
    sink: Arc<dyn EventSink>,
    state: ServiceState,
    last_reported: ServiceStatus,
}

impl<L: ManagedListener> LifecycleController<L> {
    pub fn new(
        name: impl Into<String>,
        timings: TimingConfig,
        listener: L,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let initial = ServiceStatus::new(ServiceState::StartPending);
        Self {
            name: name.into(),
            timings,
            listener,
            sink,
            state: initial.state,
            last_reported: initial,
        }
    }

    /// Current state.
    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// Drive the service from StartPending to the final StopPending report.
    ///
    /// Requests that arrive before Running is reported stay queued in
    /// `requests` and are handled in order afterwards.
    pub async fn run(
        mut self,
        mut requests: mpsc::Receiver<ControlRequest>,
        status_tx: mpsc::UnboundedSender<ServiceStatus>,
    ) -> ExitReason {
        self.transition(&status_tx, ServiceState::StartPending);
        time::sleep(self.timings.startup_delay()).await;

        match self.listener.start() {
            Ok(addr) => tracing::debug!(address = %addr, "Listener started"),
            Err(e) => self
                .sink
                .error(LISTENER_EVENT, &format!("HTTP server error: {e}")),
        }

        let started_at = Instant::now();
        self.transition(&status_tx, ServiceState::Running);
        self.sink.info(
            LIFECYCLE_EVENT,
            &format!("{} service started successfully", self.name),
        );

        let period = self.timings.liveness_interval();
        let mut liveness = time::interval_at(started_at + period, period);
        liveness.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let deadline = time::sleep(self.timings.max_uptime());
        tokio::pin!(deadline);

        let reason = loop {
            tokio::select! {
                biased;

                () = &mut deadline => {
                    self.sink.info(
                        LIFECYCLE_EVENT,
                        &format!(
                            "{} service shutting down after {} seconds",
                            self.name,
                            self.timings.max_uptime().as_secs()
                        ),
                    );
                    self.transition(&status_tx, ServiceState::StopPending);
                    break ExitReason::UptimeElapsed;
                }
                request = requests.recv() => {
                    let Some(request) = request else {
                        self.sink.info(
                            LIFECYCLE_EVENT,
                            &format!("{} control channel closed", self.name),
                        );
                        self.transition(&status_tx, ServiceState::StopPending);
                        break ExitReason::HostDisconnected;
                    };
                    if let ControlFlow::Break(reason) = self.handle(request, &status_tx) {
                        break reason;
                    }
                }
                _ = liveness.tick() => {
                    let elapsed = started_at.elapsed().as_secs();
                    self.sink.info(
                        LIFECYCLE_EVENT,
                        &format!("keepalive status: active since {elapsed} seconds"),
                    );
                }
            }
        };

        self.shutdown_listener().await;
        self.transition(&status_tx, ServiceState::StopPending);
        reason
    }

    fn handle(
        &mut self,
        request: ControlRequest,
        status_tx: &mpsc::UnboundedSender<ServiceStatus>,
    ) -> ControlFlow<ExitReason> {
        let command = request.command;
        if let ControlCommand::Unknown(code) = command {
            self.sink.error(
                LIFECYCLE_EVENT,
                &format!("{} received unexpected signal {code}", self.name),
            );
            return ControlFlow::Continue(());
        }
        self.sink.info(
            LIFECYCLE_EVENT,
            &format!("{} received {command} signal", self.name),
        );

        let reason = match command {
            ControlCommand::Interrogate => {
                if let Some(snapshot) = request.current_status {
                    if snapshot != self.last_reported {
                        tracing::debug!(
                            host = %snapshot,
                            reported = %self.last_reported,
                            "Host snapshot lags the last report"
                        );
                    }
                }
                let status = self.last_reported;
                self.report(status_tx, status);
                return ControlFlow::Continue(());
            }
            ControlCommand::Pause => {
                self.transition(status_tx, ServiceState::Paused);
                return ControlFlow::Continue(());
            }
            ControlCommand::Continue => {
                self.transition(status_tx, ServiceState::Running);
                return ControlFlow::Continue(());
            }
            ControlCommand::Stop => ExitReason::Stop,
            ControlCommand::Shutdown => ExitReason::Shutdown,
            ControlCommand::PreShutdown => ExitReason::PreShutdown,
            _ => return ControlFlow::Continue(()),
        };

        self.transition(status_tx, ServiceState::StopPending);
        self.sink.info(
            LIFECYCLE_EVENT,
            &format!("{} performing shutdown cleanup", self.name),
        );
        ControlFlow::Break(reason)
    }

    async fn shutdown_listener(&mut self) {
        let grace = self.timings.shutdown_grace();
        self.sink
            .info(LISTENER_EVENT, &format!("{} shutting down HTTP server", self.name));

        // The listener enforces `grace` itself; this guard only catches one that does not.
        let outcome = time::timeout(grace + grace / 2, self.listener.stop(grace))
            .await
            .unwrap_or(StopOutcome::TimedOut);

        match outcome {
            StopOutcome::Graceful => self.sink.info(
                LISTENER_EVENT,
                &format!("{} HTTP server shutdown complete", self.name),
            ),
            StopOutcome::Failed(e) => self
                .sink
                .error(LISTENER_EVENT, &format!("HTTP server shutdown error: {e}")),
            StopOutcome::TimedOut => self.sink.error(
                LISTENER_EVENT,
                &format!(
                    "HTTP server shutdown error: not drained within {} seconds",
                    grace.as_secs()
                ),
            ),
            StopOutcome::NotStarted => {
                tracing::debug!("Listener was not serving, nothing to drain")
            }
        }
    }

    fn transition(&mut self, status_tx: &mpsc::UnboundedSender<ServiceStatus>, state: ServiceState) {
        self.state = state;
        self.report(status_tx, ServiceStatus::new(state));
    }

    fn report(&mut self, status_tx: &mpsc::UnboundedSender<ServiceStatus>, status: ServiceStatus) {
        self.last_reported = status;
        tracing::debug!(
            state = %status.state,
            accepts = %status.accepts,
            pending = status.state.is_pending(),
            "Reporting status"
        );
        if status_tx.send(status).is_err() {
            tracing::warn!(state = %status.state, "Status receiver dropped, report lost");
        }
    }
}
