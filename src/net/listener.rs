//! Managed network listener.
//!
//! # Responsibilities
//! - Bind the configured address without blocking the caller
//! - Serve on a detached task until told to stop
//! - Drain in-flight requests on stop, bounded by a deadline
//! - Report serve errors as diagnostics, never as a crash

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::config::ListenerConfig;
use crate::http::server::build_router;
use crate::observability::events::{EventSink, LISTENER_EVENT};

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Bind address did not parse.
    #[error("invalid bind address `{address}`: {source}")]
    Address {
        address: String,
        source: std::net::AddrParseError,
    },
    /// Failed to bind to address.
    #[error("failed to bind {address}: {source}")]
    Bind { address: SocketAddr, source: io::Error },
    /// `start` was called on a listener that was already started.
    #[error("listener already started")]
    AlreadyStarted,
}

/// How a stop request ended.
#[derive(Debug)]
pub enum StopOutcome {
    /// All in-flight requests drained before the deadline.
    Graceful,
    /// The serve task ended with an error while draining.
    Failed(String),
    /// The deadline expired; the serve task was aborted.
    TimedOut,
    /// There was nothing to stop.
    NotStarted,
}

/// The one resource whose lifecycle the controller owns.
///
/// The controller calls `start` at most once and `stop` at most once.
pub trait ManagedListener: Send {
    /// Bind and begin serving in the background. Returns the bound address.
    fn start(&mut self) -> Result<SocketAddr, ListenerError>;

    /// Stop accepting and drain in-flight work within `deadline`.
    fn stop(&mut self, deadline: Duration) -> impl Future<Output = StopOutcome> + Send;
}

struct Serving {
    local_addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: ServeTask,
}

/// Serve task handle that aborts the task when dropped, so an abandoned
/// stop still releases the socket.
struct ServeTask(JoinHandle<io::Result<()>>);

impl Drop for ServeTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// HTTP listener answering every request with `ok`.
pub struct HttpListener {
    config: ListenerConfig,
    sink: Arc<dyn EventSink>,
    serving: Option<Serving>,
    started: bool,
}

impl HttpListener {
    pub fn new(config: ListenerConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config,
            sink,
            serving: None,
            started: false,
        }
    }

    /// Address the listener is bound to, while serving.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.serving.as_ref().map(|s| s.local_addr)
    }

    fn bind(&self) -> Result<(tokio::net::TcpListener, SocketAddr), ListenerError> {
        let address: SocketAddr =
            self.config
                .bind_address
                .parse()
                .map_err(|source| ListenerError::Address {
                    address: self.config.bind_address.clone(),
                    source,
                })?;

        // A std bind completes immediately; only serving needs the runtime.
        let listener = std::net::TcpListener::bind(address)
            .and_then(|l| l.set_nonblocking(true).map(|()| l))
            .map_err(|source| ListenerError::Bind { address, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ListenerError::Bind { address, source })?;

        let listener = tokio::net::TcpListener::from_std(listener)
            .map_err(|source| ListenerError::Bind { address, source })?;
        Ok((listener, local_addr))
    }
}

impl ManagedListener for HttpListener {
    fn start(&mut self) -> Result<SocketAddr, ListenerError> {
        if self.started {
            return Err(ListenerError::AlreadyStarted);
        }
        self.started = true;

        let (listener, local_addr) = self.bind()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = build_router(&self.config);
        let sink = Arc::clone(&self.sink);

        sink.info(
            LISTENER_EVENT,
            &format!("starting HTTP server on {local_addr}"),
        );

        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(ref e) = result {
                sink.error(LISTENER_EVENT, &format!("HTTP server error: {e}"));
            }
            result
        });

        self.serving = Some(Serving {
            local_addr,
            shutdown_tx,
            task: ServeTask(task),
        });
        Ok(local_addr)
    }

    fn stop(&mut self, deadline: Duration) -> impl Future<Output = StopOutcome> + Send {
        let serving = self.serving.take();
        async move {
            let Some(Serving {
                shutdown_tx,
                mut task,
                ..
            }) = serving
            else {
                return StopOutcome::NotStarted;
            };

            // The receiver is gone only if the serve task already ended.
            let _ = shutdown_tx.send(());

            // Dropping `task` on any exit aborts whatever is still running.
            match tokio::time::timeout(deadline, &mut task.0).await {
                Ok(Ok(Ok(()))) => StopOutcome::Graceful,
                Ok(Ok(Err(e))) => StopOutcome::Failed(e.to_string()),
                Ok(Err(join_error)) => StopOutcome::Failed(join_error.to_string()),
                Err(_) => StopOutcome::TimedOut,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dropped_serve_task_is_aborted() {
        let task = ServeTask(tokio::spawn(std::future::pending::<io::Result<()>>()));
        let handle = task.0.abort_handle();
        assert!(!handle.is_finished());

        drop(task);
        for _ in 0..10 {
            if handle.is_finished() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(handle.is_finished());
    }
}
