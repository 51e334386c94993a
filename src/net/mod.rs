//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Controller reaches Running
//!     → listener.rs start(): bind, spawn serve task
//!     → http/server.rs router answers requests
//! Controller enters stop sequence
//!     → listener.rs stop(deadline): signal, drain, abort on deadline
//!
//! Listener States:
//!     Idle → Serving → Released
//! ```
//!
//! # Design Decisions
//! - Binding is synchronous so bind failures surface to the controller
//! - Serving runs on its own task; the controller never awaits it until stop
//! - Shutdown is bounded; an expired deadline aborts instead of retrying

pub mod listener;

pub use listener::{HttpListener, ListenerError, ManagedListener, StopOutcome};
