//! Service state model reported to the host.
//!
//! # State Transitions
//! ```text
//! StartPending → Running: warm-up complete, listener launched
//! Running → Paused: Pause
//! Paused → Running: Continue
//! Running | Paused → StopPending: Stop, Shutdown, PreShutdown, uptime deadline
//! StopPending → Stopped: reported by the host adapter after `run` returns
//! ```

use std::fmt;
use std::ops::BitOr;

/// Lifecycle state of the service as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceState {
    StartPending,
    Running,
    PausePending,
    Paused,
    ContinuePending,
    StopPending,
    Stopped,
}

impl ServiceState {
    /// Whether the state is a transition the host should not interrupt.
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            ServiceState::StartPending
                | ServiceState::PausePending
                | ServiceState::ContinuePending
                | ServiceState::StopPending
        )
    }

    /// Commands the service accepts while in this state.
    pub fn accepted_commands(self) -> AcceptedCommands {
        match self {
            ServiceState::Running | ServiceState::Paused => AcceptedCommands::ALL,
            _ => AcceptedCommands::NONE,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceState::StartPending => "StartPending",
            ServiceState::Running => "Running",
            ServiceState::PausePending => "PausePending",
            ServiceState::Paused => "Paused",
            ServiceState::ContinuePending => "ContinuePending",
            ServiceState::StopPending => "StopPending",
            ServiceState::Stopped => "Stopped",
        };
        f.write_str(name)
    }
}

/// Set of control requests the service currently accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AcceptedCommands(u32);

impl AcceptedCommands {
    pub const NONE: Self = Self(0);
    pub const STOP: Self = Self(1 << 0);
    pub const SHUTDOWN: Self = Self(1 << 1);
    pub const PAUSE_CONTINUE: Self = Self(1 << 2);
    /// Everything a running service accepts.
    pub const ALL: Self = Self(Self::STOP.0 | Self::SHUTDOWN.0 | Self::PAUSE_CONTINUE.0);

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for AcceptedCommands {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for AcceptedCommands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names = [
            (Self::STOP, "stop"),
            (Self::SHUTDOWN, "shutdown"),
            (Self::PAUSE_CONTINUE, "pause-continue"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// A status report: the tuple handed to the host after each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceStatus {
    pub state: ServiceState,
    pub accepts: AcceptedCommands,
}

impl ServiceStatus {
    /// Status for `state` with the accepted set that state implies.
    pub fn new(state: ServiceState) -> Self {
        Self {
            state,
            accepts: state.accepted_commands(),
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (accepts: {})", self.state, self.accepts)
    }
}
