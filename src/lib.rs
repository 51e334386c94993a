//! Managed service library.
//!
//! A background service that reports its lifecycle to the host service
//! manager, serves a single HTTP endpoint while running, and stops itself
//! after a maximum uptime.

pub mod config;
pub mod host;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::schema::ServiceConfig;
pub use lifecycle::{ExitReason, LifecycleController};
pub use net::HttpListener;
pub use observability::{EventSink, TracingEventSink};
