//! Inbound control requests.

use std::fmt;

use crate::lifecycle::state::ServiceStatus;

/// Command code delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlCommand {
    Interrogate,
    Stop,
    Shutdown,
    PreShutdown,
    Pause,
    Continue,
    ParamChange,
    NetBindAdd,
    NetBindRemove,
    NetBindEnable,
    NetBindDisable,
    DeviceEvent,
    HardwareProfileChange,
    PowerEvent,
    SessionChange,
    /// A code this service does not know.
    Unknown(u32),
}

impl ControlCommand {
    /// Map a raw host control code to a command.
    ///
    /// Codes follow the numbering used by the Windows service control manager.
    pub fn from_code(code: u32) -> Self {
        match code {
            0x01 => ControlCommand::Stop,
            0x02 => ControlCommand::Pause,
            0x03 => ControlCommand::Continue,
            0x04 => ControlCommand::Interrogate,
            0x05 => ControlCommand::Shutdown,
            0x06 => ControlCommand::ParamChange,
            0x07 => ControlCommand::NetBindAdd,
            0x08 => ControlCommand::NetBindRemove,
            0x09 => ControlCommand::NetBindEnable,
            0x0A => ControlCommand::NetBindDisable,
            0x0B => ControlCommand::DeviceEvent,
            0x0C => ControlCommand::HardwareProfileChange,
            0x0D => ControlCommand::PowerEvent,
            0x0E => ControlCommand::SessionChange,
            0x0F => ControlCommand::PreShutdown,
            other => ControlCommand::Unknown(other),
        }
    }

    /// Raw host control code.
    pub fn code(self) -> u32 {
        match self {
            ControlCommand::Stop => 0x01,
            ControlCommand::Pause => 0x02,
            ControlCommand::Continue => 0x03,
            ControlCommand::Interrogate => 0x04,
            ControlCommand::Shutdown => 0x05,
            ControlCommand::ParamChange => 0x06,
            ControlCommand::NetBindAdd => 0x07,
            ControlCommand::NetBindRemove => 0x08,
            ControlCommand::NetBindEnable => 0x09,
            ControlCommand::NetBindDisable => 0x0A,
            ControlCommand::DeviceEvent => 0x0B,
            ControlCommand::HardwareProfileChange => 0x0C,
            ControlCommand::PowerEvent => 0x0D,
            ControlCommand::SessionChange => 0x0E,
            ControlCommand::PreShutdown => 0x0F,
            ControlCommand::Unknown(code) => code,
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlCommand::Unknown(code) => write!(f, "{code}"),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

/// A control request as delivered to the lifecycle controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRequest {
    pub command: ControlCommand,
    /// Last status the host acknowledged; set by adapters on Interrogate.
    pub current_status: Option<ServiceStatus>,
}

impl ControlRequest {
    pub fn new(command: ControlCommand) -> Self {
        Self {
            command,
            current_status: None,
        }
    }

    /// Interrogate carrying the host's snapshot of the last reported status.
    pub fn interrogate(current_status: ServiceStatus) -> Self {
        Self {
            command: ControlCommand::Interrogate,
            current_status: Some(current_status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(ControlCommand::from_code(1), ControlCommand::Stop);
        assert_eq!(ControlCommand::from_code(4), ControlCommand::Interrogate);
        assert_eq!(ControlCommand::from_code(15), ControlCommand::PreShutdown);
        for code in 1..=15 {
            assert_eq!(ControlCommand::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let command = ControlCommand::from_code(999);
        assert_eq!(command, ControlCommand::Unknown(999));
        assert_eq!(command.code(), 999);
        assert_eq!(command.to_string(), "999");
        assert_eq!(ControlCommand::SessionChange.to_string(), "SessionChange");
    }
}
