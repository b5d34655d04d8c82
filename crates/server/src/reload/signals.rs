//! Signal handling for credential reload and shutdown.
//!
//! Bridges OS signals with the async runtime: a signal-hook thread forwards
//! SIGHUP (reload) and SIGTERM/SIGINT (shutdown) over a channel that async
//! code drains from a blocking task.

use std::io;
use std::sync::{mpsc, Arc, Mutex};

use tracing::{debug, info, trace};

/// Signal type for cross-thread communication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalType {
    /// Reload the credential file (SIGHUP)
    Reload,
    /// Graceful shutdown (SIGTERM/SIGINT)
    Shutdown,
}

/// Bridges thread-based signal handlers with the async runtime using channels.
#[derive(Clone)]
pub struct SignalManager {
    tx: mpsc::Sender<SignalType>,
    rx: Arc<Mutex<mpsc::Receiver<SignalType>>>,
}

impl SignalManager {
    pub fn new() -> Self {
        debug!("Creating signal manager");
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Get a sender for use in signal handlers
    pub fn sender(&self) -> mpsc::Sender<SignalType> {
        trace!("Cloning signal sender for handler");
        self.tx.clone()
    }

    /// Register OS signal handlers feeding this manager
    #[cfg(unix)]
    pub fn install(&self) -> io::Result<()> {
        use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;
        use std::thread;

        let mut signals = Signals::new([SIGTERM, SIGINT, SIGHUP])?;
        let tx = self.sender();

        thread::Builder::new()
            .name("certvault-signals".to_string())
            .spawn(move || {
                for sig in signals.forever() {
                    let signal = match sig {
                        SIGHUP => SignalType::Reload,
                        _ => SignalType::Shutdown,
                    };
                    info!(signal = ?signal, "Received OS signal");
                    if tx.send(signal).is_err() {
                        break;
                    }
                }
            })?;

        Ok(())
    }

    #[cfg(not(unix))]
    pub fn install(&self) -> io::Result<()> {
        debug!("Signal handling is not supported on this platform");
        Ok(())
    }

    /// Receive the next signal (blocking)
    ///
    /// This should be called from an async context using spawn_blocking
    pub fn recv_blocking(&self) -> Option<SignalType> {
        trace!("Waiting for signal (blocking)");
        let signal = self.rx.lock().ok()?.recv().ok();
        if let Some(ref s) = signal {
            debug!(signal = ?s, "Received signal");
        }
        signal
    }
}

impl Default for SignalManager {
    fn default() -> Self {
        Self::new()
    }
}
