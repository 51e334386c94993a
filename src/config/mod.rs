//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → sections handed to the controller, listener and logging
//! ```
//!
//! # Design Decisions
//! - No file is required: defaults are the built-in service policy
//! - Config is immutable once loaded; ParamChange does not reload it
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ListenerConfig, LogFormat, ObservabilityConfig, ServiceConfig, ServiceIdentity, TimingConfig,
};
pub use validation::ValidationError;
