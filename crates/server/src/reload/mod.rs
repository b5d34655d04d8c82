//! Credential reload and shutdown coordination.
//!
//! SIGHUP re-reads the credential file into the running [`ReloadableGate`];
//! SIGTERM and SIGINT trigger a graceful shutdown observed through
//! [`ShutdownSignal`].

mod signals;

pub use signals::{SignalManager, SignalType};

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::ReloadableGate;

/// Owner side of the shutdown broadcast
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Ask every [`ShutdownSignal`] to resolve
    pub fn trigger(&self) {
        info!("Shutdown requested");
        self.tx.send_replace(true);
    }

    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves once shutdown has been requested
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub async fn wait(mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                debug!("Shutdown sender dropped");
                return;
            }
        }
    }
}

/// Apply one signal
pub fn handle_signal(signal: SignalType, gate: &ReloadableGate, shutdown: &Shutdown) -> ControlFlow<()> {
    match signal {
        SignalType::Reload => {
            info!(path = %gate.path().display(), "Reloading credentials");
            // reload() logs failures and keeps the previous map
            let _ = gate.reload();
            ControlFlow::Continue(())
        }
        SignalType::Shutdown => {
            shutdown.trigger();
            ControlFlow::Break(())
        }
    }
}

/// Install OS signal handlers and drive them from the runtime
pub fn spawn_signal_loop(gate: Arc<ReloadableGate>, shutdown: Arc<Shutdown>) -> std::io::Result<()> {
    let manager = SignalManager::new();
    manager.install()?;

    tokio::spawn(async move {
        loop {
            let receiver = manager.clone();
            let signal = match tokio::task::spawn_blocking(move || receiver.recv_blocking()).await {
                Ok(Some(signal)) => signal,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Signal receiver task failed");
                    break;
                }
            };

            if handle_signal(signal, &gate, &shutdown).is_break() {
                break;
            }
        }
        debug!("Signal loop finished");
    });

    info!("Signal handling installed (SIGHUP reloads credentials)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use certvault_common::{ApiKey, ItemKind};
    use crate::backend::CredentialGate;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_shutdown_signal_resolves_after_trigger() {
        let shutdown = Shutdown::new();
        let signal = shutdown.signal();
        let waiter = tokio::spawn(signal.wait());

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();

        // Signals created after the trigger resolve immediately
        tokio::time::timeout(Duration::from_secs(1), shutdown.signal().wait())
            .await
            .unwrap();
    }

    #[test]
    fn test_handle_signal() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("auth.json");
        fs::write(&path, r#"{"key-a": "example.com"}"#).unwrap();
        let gate = ReloadableGate::load(&path).unwrap();
        let shutdown = Shutdown::new();
        let signal = shutdown.signal();

        fs::write(&path, r#"{}"#).unwrap();
        assert!(handle_signal(SignalType::Reload, &gate, &shutdown).is_continue());
        assert!(!gate.has_access("example.com", ItemKind::Key, &ApiKey::from("key-a")));
        assert!(!*signal.rx.borrow());

        assert!(handle_signal(SignalType::Shutdown, &gate, &shutdown).is_break());
        assert!(*signal.rx.borrow());
    }
}
