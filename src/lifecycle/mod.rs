//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Host adapter
//!     → control.rs (ControlRequest on an mpsc channel)
//!     → controller.rs (one event per iteration: deadline, request, liveness tick)
//!     → state.rs (ServiceStatus on the outbound channel)
//!     → Host adapter → service manager
//!
//! Controller → net::listener start() on Running entry, stop(deadline) on exit
//! ```
//!
//! # Design Decisions
//! - Single owner of state: no locks, transitions are serialized by the loop
//! - Every state-changing command produces exactly one report
//! - Shutdown has a deadline: the listener is abandoned after it

pub mod control;
pub mod controller;
pub mod state;

pub use control::{ControlCommand, ControlRequest};
pub use controller::{ExitReason, LifecycleController};
pub use state::{AcceptedCommands, ServiceState, ServiceStatus};
