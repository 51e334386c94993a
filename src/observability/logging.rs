//! Structured logging setup.
//!
//! `RUST_LOG` wins over the configured level. An unparsable configured
//! filter falls back to `info`; failing to install the global subscriber is
//! returned to the caller, which aborts startup.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Install the global tracing subscriber.
pub fn init(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let (filter, rejected) = build_filter(&config.log_level);

    match config.log_format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?,
    }

    if let Some(level) = rejected {
        tracing::warn!(log_level = %level, "Invalid log level in configuration, using info");
    }
    Ok(())
}

/// Build the filter, returning the rejected directive when the configured
/// one does not parse.
fn build_filter(level: &str) -> (EnvFilter, Option<String>) {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return (filter, None);
    }
    match EnvFilter::try_new(level) {
        Ok(filter) => (filter, None),
        Err(_) => (EnvFilter::new("info"), Some(level.to_string())),
    }
}
