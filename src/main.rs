//! Managed service
//!
//! A background service controlled by the host service manager.
//!
//! # Architecture Overview
//!
//! ```text
//!    Service manager / signals
//!              │ control requests
//!              ▼
//!    ┌──────────────────┐   status reports   ┌───────────────────┐
//!    │   host adapter   │◀───────────────────│ lifecycle         │
//!    │ (windows|console)│───────────────────▶│ controller        │
//!    └──────────────────┘   mpsc channels    │ liveness tick     │
//!                                            │ uptime deadline   │
//!                                            └─────────┬─────────┘
//!                                                      │ start / stop(deadline)
//!                                                      ▼
//!                                            ┌───────────────────┐
//!                                            │ net listener      │──▶ "ok"
//!                                            │ + http router     │
//!                                            └───────────────────┘
//!
//!    Cross-cutting: config (TOML + defaults), observability (tracing, event sink)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use managed_service::config::{load_config, ServiceConfig};
use managed_service::observability::events::HOST_EVENT;
use managed_service::observability::{logging, EventSink, TracingEventSink};

#[derive(Parser)]
#[command(name = "managed-service")]
#[command(about = "Background service with a managed HTTP endpoint", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; built-in defaults otherwise.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Run under the host service manager
    Service,
    /// Run in the foreground, driven by process signals
    Console,
}

impl Commands {
    fn platform_default() -> Self {
        if cfg!(windows) {
            Commands::Service
        } else {
            Commands::Console
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    // Without a diagnostic sink there is nothing to report to: abort.
    logging::init(&config.observability)?;

    let name = config.service.name.clone();
    let sink: Arc<dyn EventSink> = Arc::new(TracingEventSink::new(name.clone()));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        startup_delay_secs = config.timings.startup_delay_secs,
        liveness_interval_secs = config.timings.liveness_interval_secs,
        max_uptime_secs = config.timings.max_uptime_secs,
        "Configuration loaded"
    );
    sink.info(HOST_EVENT, &format!("starting {name} service"));

    let command = cli.command.unwrap_or_else(Commands::platform_default);
    let result = match command {
        Commands::Service => run_service(config),
        Commands::Console => run_console(config, Arc::clone(&sink)),
    };

    match result {
        Ok(()) => {
            sink.info(HOST_EVENT, &format!("{name} service stopped"));
            Ok(())
        }
        Err(e) => {
            sink.error(HOST_EVENT, &format!("{name} service failed: {e}"));
            Err(e)
        }
    }
}

#[cfg(windows)]
fn run_service(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    managed_service::host::windows::run_dispatcher(config)?;
    Ok(())
}

#[cfg(not(windows))]
fn run_service(_config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    Err(managed_service::host::HostError::Unsupported.into())
}

fn run_console(
    config: ServiceConfig,
    sink: Arc<dyn EventSink>,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    let reason = runtime.block_on(managed_service::host::console::run(config, sink))?;
    tracing::info!(reason = ?reason, "Shutdown complete");
    Ok(())
}
