//! Diagnostic event sink.
//!
//! Every diagnostic the service emits is a leveled message tagged with an
//! event source (the service name) and a numeric event id, the shape host
//! event logs expect.

use std::sync::Arc;

/// Lifecycle transitions, control requests and liveness ticks.
pub const LIFECYCLE_EVENT: u32 = 1;

/// Listener start, serve and shutdown.
pub const LISTENER_EVENT: u32 = 2;

/// Host adapter registration and dispatch.
pub const HOST_EVENT: u32 = 3;

/// Write-only destination for diagnostics.
pub trait EventSink: Send + Sync {
    /// Record an informational message.
    fn info(&self, event_id: u32, message: &str);

    /// Record an error message.
    fn error(&self, event_id: u32, message: &str);
}

impl<T> EventSink for Arc<T>
where
    T: EventSink + ?Sized,
{
    fn info(&self, event_id: u32, message: &str) {
        (**self).info(event_id, message);
    }

    fn error(&self, event_id: u32, message: &str) {
        (**self).error(event_id, message);
    }
}

/// Default sink that records diagnostics using `tracing`.
#[derive(Debug, Clone)]
pub struct TracingEventSink {
    source: String,
}

impl TracingEventSink {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl EventSink for TracingEventSink {
    fn info(&self, event_id: u32, message: &str) {
        tracing::info!(
            target: "managed_service::events",
            event_source = %self.source,
            event_id,
            "{message}"
        );
    }

    fn error(&self, event_id: u32, message: &str) {
        tracing::error!(
            target: "managed_service::events",
            event_source = %self.source,
            event_id,
            "{message}"
        );
    }
}
