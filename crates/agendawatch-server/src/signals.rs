//! Operator interrupt handling.
//!
//! SIGTERM and SIGINT (Ctrl+C elsewhere) flip a shared shutdown flag. Every
//! long wait in the watcher goes through [`ShutdownHandle::guard`] or
//! [`ShutdownHandle::sleep`], so an interrupt is observed within one await
//! point instead of after the current sleep. A second signal while the
//! watcher is still winding down exits the process at once.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::{ServerError, ServerResult};

/// Exit code when a second signal arrives before shutdown completes.
pub const FORCED_EXIT_CODE: i32 = 130;

/// What the listener does with the n-th signal it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalAction {
    /// Ask the watcher to stop at its next await point.
    Stop,
    /// Leave immediately, without the goodbye message.
    ForceExit,
}

impl SignalAction {
    fn after(received: u32) -> Self {
        if received <= 1 {
            Self::Stop
        } else {
            Self::ForceExit
        }
    }
}

/// Listens for process signals and exposes them as a shutdown flag.
pub struct SignalHandler {
    handle: ShutdownHandle,
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalHandler {
    /// Creates a new signal handler.
    pub fn new() -> Self {
        Self {
            handle: ShutdownHandle::new(),
        }
    }

    /// Spawns the signal listener task.
    ///
    /// Call once, from inside the runtime, before the watcher starts.
    #[cfg(unix)]
    pub fn spawn_listener(&self) {
        let handle = self.handle.clone();

        tokio::spawn(async move {
            use tokio::signal::unix::{SignalKind, signal};

            let (mut sigterm, mut sigint) = match (
                signal(SignalKind::terminate()),
                signal(SignalKind::interrupt()),
            ) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    error!(error = %e, "Failed to install signal handlers");
                    return;
                }
            };

            let mut received = 0;
            loop {
                let name = tokio::select! {
                    _ = sigterm.recv() => "SIGTERM",
                    _ = sigint.recv() => "SIGINT",
                };
                received += 1;
                match SignalAction::after(received) {
                    SignalAction::Stop => {
                        info!(signal = name, "Received signal, stopping");
                        handle.trigger();
                    }
                    SignalAction::ForceExit => {
                        warn!(signal = name, "Received second signal, exiting now");
                        std::process::exit(FORCED_EXIT_CODE);
                    }
                }
            }
        });
    }

    /// Non-Unix implementation: Ctrl+C only.
    #[cfg(not(unix))]
    pub fn spawn_listener(&self) {
        let handle = self.handle.clone();

        tokio::spawn(async move {
            let mut received = 0;
            while tokio::signal::ctrl_c().await.is_ok() {
                received += 1;
                match SignalAction::after(received) {
                    SignalAction::Stop => {
                        info!("Received Ctrl+C, stopping");
                        handle.trigger();
                    }
                    SignalAction::ForceExit => {
                        warn!("Received second Ctrl+C, exiting now");
                        std::process::exit(FORCED_EXIT_CODE);
                    }
                }
            }
        });
    }

    /// Returns true if shutdown has been signaled.
    pub fn is_shutdown(&self) -> bool {
        self.handle.is_shutdown()
    }

    /// Creates a shutdown handle that can be passed to other components.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.handle.clone()
    }
}

/// A signal that completes when shutdown is signaled.
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Waits for the shutdown signal.
    pub async fn wait(mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// A handle for triggering or observing shutdown.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    /// Creates a standalone handle not tied to process signals.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Triggers a shutdown.
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    /// Returns true if shutdown has been triggered.
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Returns a future that completes when shutdown is triggered.
    pub fn wait(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.rx.clone(),
        }
    }

    /// Runs `fut` unless shutdown wins first.
    ///
    /// Returns [`ServerError::Interrupted`] if shutdown was already triggered
    /// or fires while `fut` is pending. `fut` is dropped in that case.
    pub async fn guard<F: Future>(&self, fut: F) -> ServerResult<F::Output> {
        if self.is_shutdown() {
            return Err(ServerError::Interrupted);
        }
        tokio::select! {
            biased;
            _ = self.wait().wait() => Err(ServerError::Interrupted),
            out = fut => Ok(out),
        }
    }

    /// Sleeps for `duration`, waking early on shutdown.
    pub async fn sleep(&self, duration: Duration) -> ServerResult<()> {
        self.guard(tokio::time::sleep(duration)).await
    }
}
