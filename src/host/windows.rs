//! Windows service control manager host.

use std::ffi::OsString;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use windows_service::service::{
    ServiceControl, ServiceControlAccept, ServiceExitCode, ServiceState as ScmState,
    ServiceStatus as ScmStatus, ServiceType,
};
use windows_service::service_control_handler::{self, ServiceControlHandlerResult};
use windows_service::{define_windows_service, service_dispatcher};

use crate::config::{ServiceConfig, TimingConfig};
use crate::host::{build_controller, HostError, CONTROL_CHANNEL_CAPACITY};
use crate::lifecycle::{
    AcceptedCommands, ControlCommand, ControlRequest, ServiceState, ServiceStatus,
};
use crate::observability::events::{EventSink, TracingEventSink, HOST_EVENT};

// The dispatcher calls back through an FFI entry point with no user data.
static LAUNCH: OnceLock<ServiceConfig> = OnceLock::new();

define_windows_service!(ffi_service_main, service_main);

/// Hand the process to the service control manager. Blocks until the service stops.
pub fn run_dispatcher(config: ServiceConfig) -> Result<(), HostError> {
    let name = config.service.name.clone();
    LAUNCH.set(config).map_err(|_| HostError::AlreadyDispatched)?;
    service_dispatcher::start(&name, ffi_service_main)?;
    Ok(())
}

fn service_main(_arguments: Vec<OsString>) {
    let Some(config) = LAUNCH.get() else {
        return;
    };
    let sink: Arc<dyn EventSink> = Arc::new(TracingEventSink::new(config.service.name.clone()));
    if let Err(e) = run_service(config.clone(), Arc::clone(&sink)) {
        sink.error(
            HOST_EVENT,
            &format!("{} service failed: {e}", config.service.name),
        );
    }
}

fn run_service(config: ServiceConfig, sink: Arc<dyn EventSink>) -> Result<(), HostError> {
    let runtime = tokio::runtime::Runtime::new()?;
    let (request_tx, request_rx) = mpsc::channel(CONTROL_CHANNEL_CAPACITY);
    let (status_tx, mut status_rx) = mpsc::unbounded_channel::<ServiceStatus>();
    let (last_tx, last_rx) = watch::channel(ServiceStatus::new(ServiceState::StartPending));

    let handler = move |control: ServiceControl| -> ServiceControlHandlerResult {
        let command = command_for(&control);
        let request = match command {
            ControlCommand::Interrogate => ControlRequest::interrogate(*last_rx.borrow()),
            other => ControlRequest::new(other),
        };
        match request_tx.try_send(request) {
            Ok(()) => match command {
                ControlCommand::Unknown(_) => ServiceControlHandlerResult::NotImplemented,
                _ => ServiceControlHandlerResult::NoError,
            },
            Err(e) => {
                tracing::warn!(command = %command, error = %e, "Control request dropped");
                ServiceControlHandlerResult::NoError
            }
        }
    };
    let status_handle = service_control_handler::register(&config.service.name, handler)?;

    let timings = config.timings.clone();
    let controller = build_controller(&config, sink);
    let reason = runtime.block_on(async move {
        let forwarder = tokio::spawn(async move {
            while let Some(status) = status_rx.recv().await {
                last_tx.send_replace(status);
                if let Err(e) = status_handle.set_service_status(scm_status(status, &timings)) {
                    tracing::error!(state = %status.state, error = %e, "Failed to report status");
                }
            }
        });
        let reason = controller.run(request_rx, status_tx).await;
        let _ = forwarder.await;
        reason
    });
    tracing::info!(reason = ?reason, "Control loop finished");

    status_handle.set_service_status(ScmStatus {
        service_type: ServiceType::OWN_PROCESS,
        current_state: ScmState::Stopped,
        controls_accepted: ServiceControlAccept::empty(),
        exit_code: ServiceExitCode::Win32(0),
        checkpoint: 0,
        wait_hint: Duration::default(),
        process_id: None,
    })?;
    Ok(())
}

fn command_for(control: &ServiceControl) -> ControlCommand {
    match control {
        ServiceControl::Stop => ControlCommand::Stop,
        ServiceControl::Shutdown => ControlCommand::Shutdown,
        ServiceControl::Preshutdown => ControlCommand::PreShutdown,
        ServiceControl::Pause => ControlCommand::Pause,
        ServiceControl::Continue => ControlCommand::Continue,
        ServiceControl::Interrogate => ControlCommand::Interrogate,
        other => ControlCommand::from_code(other.raw_service_control_type()),
    }
}

fn scm_status(status: ServiceStatus, timings: &TimingConfig) -> ScmStatus {
    let current_state = match status.state {
        ServiceState::StartPending => ScmState::StartPending,
        ServiceState::Running => ScmState::Running,
        ServiceState::PausePending => ScmState::PausePending,
        ServiceState::Paused => ScmState::Paused,
        ServiceState::ContinuePending => ScmState::ContinuePending,
        ServiceState::StopPending => ScmState::StopPending,
        ServiceState::Stopped => ScmState::Stopped,
    };

    let mut controls_accepted = ServiceControlAccept::empty();
    if status.accepts.contains(AcceptedCommands::STOP) {
        controls_accepted |= ServiceControlAccept::STOP;
    }
    if status.accepts.contains(AcceptedCommands::SHUTDOWN) {
        controls_accepted |= ServiceControlAccept::SHUTDOWN;
    }
    if status.accepts.contains(AcceptedCommands::PAUSE_CONTINUE) {
        controls_accepted |= ServiceControlAccept::PAUSE_CONTINUE;
    }

    // The service manager gives up on a pending service after the hint.
    let wait_hint = match status.state {
        ServiceState::StartPending => timings.startup_delay() + timings.shutdown_grace(),
        ServiceState::StopPending => timings.shutdown_grace() * 2,
        _ => Duration::default(),
    };

    ScmStatus {
        service_type: ServiceType::OWN_PROCESS,
        current_state,
        controls_accepted,
        exit_code: ServiceExitCode::Win32(0),
        checkpoint: 0,
        wait_hint,
        process_id: None,
    }
}
