//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted TCP connection (net/listener.rs)
//!     → server.rs (request ID, trace, timeout)
//!     → ok_handler
//!     → "ok"
//! ```

pub mod server;

pub use server::{build_router, OK_BODY};
