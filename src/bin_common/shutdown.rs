//! Graceful shutdown management

use socklink::ConnectionManager;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::time::sleep;
use tracing::{info, warn};

/// Ctrl+C aware running flag for long-lived binaries
pub struct ShutdownManager {
    flag: Arc<AtomicBool>,
}

impl ShutdownManager {
    /// Create a new shutdown manager with running state
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Spawn a Ctrl+C signal handler that triggers shutdown
    pub fn spawn_signal_handler(&self) {
        let flag = Arc::clone(&self.flag);
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                info!("Received shutdown signal (Ctrl+C)");
                flag.store(false, Ordering::Release);
            }
        });
    }

    /// Check if the process should continue running
    pub fn is_running(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Trigger shutdown without a signal
    pub fn trigger(&self) {
        self.flag.store(false, Ordering::Release);
    }

    /// Sleep for a duration, but wake early if shutdown is triggered
    pub async fn interruptible_sleep(&self, duration: Duration) {
        let check_interval = Duration::from_millis(50);
        let mut elapsed = Duration::ZERO;

        while elapsed < duration && self.is_running() {
            sleep(check_interval).await;
            elapsed += check_interval;
        }
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Stop `manager` on the way out
///
/// A stop timeout is only logged: dropping the manager afterwards shuts the
/// transport down regardless. Any other failure is returned.
pub async fn stop_or_warn(manager: &ConnectionManager) -> anyhow::Result<()> {
    match manager.stop().await {
        Ok(()) => Ok(()),
        Err(e) if e.is_timeout() => {
            warn!(
                manager = manager.label(),
                status = %manager.status(),
                "Stop did not settle, shutting down anyway: {}",
                e
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
