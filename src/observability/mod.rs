//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Lifecycle controller, listener task, host adapters
//!     → events.rs (EventSink: leveled messages with source + event id)
//!     → tracing events
//!     → logging.rs (subscriber: filter + fmt/json layer)
//!     → stdout / host log collector
//! ```
//!
//! # Design Decisions
//! - The sink is injected, never a process-wide handle
//! - Diagnostics are fire-and-forget; lifecycle never depends on them
//! - Failing to install the subscriber is the only fatal logging error

pub mod events;
pub mod logging;

pub use events::{EventSink, TracingEventSink};
