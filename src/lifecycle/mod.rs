//! Process lifecycle: shutdown coordination and signal handling.
//!
//! # Design Decisions
//! - One broadcast channel; every long-running task subscribes
//! - Signal handling lives here so the entry point stays small

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Waits for ctrl-c and triggers shutdown. Spawned by the entry point.
    pub async fn listen_for_signals(&self) {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::error!("Failed to install ctrl-c handler");
            return;
        }
        tracing::info!("Shutdown signal received");
        self.trigger();
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
