//! Configuration validation.
//!
//! Returns all validation errors, not just the first. Serde handles syntax;
//! this pass checks values that parse but cannot run.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("service.name must not be empty")]
    EmptyServiceName,
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.service.name.trim().is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let durations = [
        ("listener.request_timeout_secs", config.listener.request_timeout_secs),
        ("timings.liveness_interval_secs", config.timings.liveness_interval_secs),
        ("timings.max_uptime_secs", config.timings.max_uptime_secs),
        ("timings.shutdown_grace_secs", config.timings.shutdown_grace_secs),
    ];
    for (field, value) in durations {
        if value == 0 {
            errors.push(ValidationError::ZeroDuration(field));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ServiceConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = ServiceConfig::default();
        config.service.name = "  ".into();
        config.listener.bind_address = "localhost".into();
        config.timings.max_uptime_secs = 0;
        config.timings.liveness_interval_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyServiceName,
                ValidationError::InvalidBindAddress("localhost".into()),
                ValidationError::ZeroDuration("timings.liveness_interval_secs"),
                ValidationError::ZeroDuration("timings.max_uptime_secs"),
            ]
        );
    }

    #[test]
    fn test_zero_startup_delay_is_allowed() {
        let mut config = ServiceConfig::default();
        config.timings.startup_delay_secs = 0;
        assert!(validate_config(&config).is_ok());
    }
}
