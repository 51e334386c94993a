//! Service host adapters.
//!
//! # Data Flow
//! ```text
//! Service manager / process signals
//!     → adapter translates to ControlRequest → controller inbound channel
//! Controller outbound ServiceStatus
//!     → adapter forwards to the service manager / log
//! Controller returns ExitReason
//!     → adapter reports Stopped
//! ```
//!
//! # Design Decisions
//! - Adapters own no lifecycle state; they only translate and forward
//! - The last forwarded status is kept in a watch channel so Interrogate can
//!   carry the host's snapshot

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::config::ServiceConfig;
use crate::lifecycle::LifecycleController;
use crate::net::HttpListener;
use crate::observability::EventSink;

pub mod console;
#[cfg(windows)]
pub mod windows;

/// Control requests buffered while the controller is busy (e.g. warming up).
pub const CONTROL_CHANNEL_CAPACITY: usize = 32;

/// Error type for host adapters.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[cfg(windows)]
    #[error("service manager error: {0}")]
    ServiceManager(#[from] windows_service::Error),
    #[error("service dispatcher already started")]
    AlreadyDispatched,
    #[error("running under the service manager is only supported on Windows")]
    Unsupported,
}

/// Build the controller for `config`, owning an unstarted HTTP listener.
pub fn build_controller(
    config: &ServiceConfig,
    sink: Arc<dyn EventSink>,
) -> LifecycleController<HttpListener> {
    let listener = HttpListener::new(config.listener.clone(), Arc::clone(&sink));
    LifecycleController::new(
        config.service.name.clone(),
        config.timings.clone(),
        listener,
        sink,
    )
}
