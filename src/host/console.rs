//! Foreground host: process signals stand in for the service manager.
//!
//! # Signal Mapping
//! ```text
//! Ctrl+C  → Stop
//! SIGTERM → Shutdown
//! SIGHUP  → ParamChange
//! SIGUSR1 → Interrogate
//! SIGUSR2 → Pause, or Continue when paused
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::ServiceConfig;
use crate::host::{build_controller, HostError, CONTROL_CHANNEL_CAPACITY};
use crate::lifecycle::{
    ControlCommand, ControlRequest, ExitReason, ServiceState, ServiceStatus,
};
use crate::observability::EventSink;

/// Run the service in the foreground until it stops.
pub async fn run(config: ServiceConfig, sink: Arc<dyn EventSink>) -> Result<ExitReason, HostError> {
    let (request_tx, request_rx) = mpsc::channel(CONTROL_CHANNEL_CAPACITY);
    let (status_tx, mut status_rx) = mpsc::unbounded_channel::<ServiceStatus>();
    let (last_tx, last_rx) = watch::channel(ServiceStatus::new(ServiceState::StartPending));

    let signals = spawn_signal_forwarder(request_tx, last_rx)?;
    let controller = build_controller(&config, sink);

    let forwarder = tokio::spawn(async move {
        while let Some(status) = status_rx.recv().await {
            tracing::info!(state = %status.state, accepts = %status.accepts, "Service status");
            last_tx.send_replace(status);
        }
    });

    let reason = controller.run(request_rx, status_tx).await;
    signals.abort();
    let _ = forwarder.await;

    tracing::info!(state = %ServiceState::Stopped, reason = ?reason, "Service status");
    Ok(reason)
}

/// Pick the command for the pause toggle from the last reported state.
fn toggle_pause(last: ServiceState) -> ControlCommand {
    if last == ServiceState::Paused {
        ControlCommand::Continue
    } else {
        ControlCommand::Pause
    }
}

fn request_for(command: ControlCommand, last: &watch::Receiver<ServiceStatus>) -> ControlRequest {
    match command {
        ControlCommand::Interrogate => ControlRequest::interrogate(*last.borrow()),
        other => ControlRequest::new(other),
    }
}

#[cfg(unix)]
fn spawn_signal_forwarder(
    request_tx: mpsc::Sender<ControlRequest>,
    last: watch::Receiver<ServiceStatus>,
) -> Result<JoinHandle<()>, HostError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;
    let mut user1 = signal(SignalKind::user_defined1())?;
    let mut user2 = signal(SignalKind::user_defined2())?;

    Ok(tokio::spawn(async move {
        loop {
            let command = tokio::select! {
                _ = tokio::signal::ctrl_c() => ControlCommand::Stop,
                _ = terminate.recv() => ControlCommand::Shutdown,
                _ = hangup.recv() => ControlCommand::ParamChange,
                _ = user1.recv() => ControlCommand::Interrogate,
                _ = user2.recv() => toggle_pause(last.borrow().state),
            };
            tracing::debug!(command = %command, code = command.code(), "Signal received");
            if request_tx.send(request_for(command, &last)).await.is_err() {
                break;
            }
        }
    }))
}

#[cfg(not(unix))]
fn spawn_signal_forwarder(
    request_tx: mpsc::Sender<ControlRequest>,
    last: watch::Receiver<ServiceStatus>,
) -> Result<JoinHandle<()>, HostError> {
    Ok(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("Ctrl+C received");
            if request_tx
                .send(request_for(ControlCommand::Stop, &last))
                .await
                .is_err()
            {
                break;
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_toggle() {
        assert_eq!(toggle_pause(ServiceState::Running), ControlCommand::Pause);
        assert_eq!(toggle_pause(ServiceState::Paused), ControlCommand::Continue);
    }

    #[test]
    fn test_interrogate_carries_snapshot() {
        let (_tx, rx) = watch::channel(ServiceStatus::new(ServiceState::Paused));
        let request = request_for(ControlCommand::Interrogate, &rx);
        assert_eq!(
            request.current_status,
            Some(ServiceStatus::new(ServiceState::Paused))
        );
        assert_eq!(request_for(ControlCommand::Stop, &rx).current_status, None);
    }
}
