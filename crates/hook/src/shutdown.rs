//! Process shutdown triggers
//!
//! The server stops on Ctrl+C, SIGTERM, or when a callback reports a
//! condition that makes every further request meaningless.

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Handle callbacks use to request a fatal shutdown
#[derive(Debug, Clone)]
pub struct FatalSignal {
    tx: mpsc::Sender<String>,
}

/// Receiving side of [`FatalSignal`], held by the process entry point
#[derive(Debug)]
pub struct FatalReceiver {
    rx: mpsc::Receiver<String>,
}

pub fn fatal_channel() -> (FatalSignal, FatalReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (FatalSignal { tx }, FatalReceiver { rx })
}

impl FatalSignal {
    /// Request shutdown; only the first reason is kept
    pub fn trigger(&self, reason: impl Into<String>) {
        if self.tx.try_send(reason.into()).is_err() {
            debug!("Fatal shutdown already requested");
        }
    }
}

impl FatalReceiver {
    /// Wait for the first fatal reason. Returns `None` once every
    /// [`FatalSignal`] has been dropped without triggering.
    pub async fn wait(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn wait_for_termination() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = sigterm => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_reason_wins() {
        let (signal, mut receiver) = fatal_channel();
        signal.trigger("first");
        signal.clone().trigger("second");
        assert_eq!(receiver.wait().await.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_wait_ends_when_signals_dropped() {
        let (signal, mut receiver) = fatal_channel();
        drop(signal);
        assert_eq!(receiver.wait().await, None);
    }
}
