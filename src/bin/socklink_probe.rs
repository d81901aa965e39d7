//! Connection probe
//!
//! Drives one `ConnectionManager` from a YAML config: starts it, logs every
//! status transition and a periodic heartbeat, and stops it on Ctrl+C.
//!
//! Usage: `socklink_probe [config.yaml]` (default `$SOCKLINK_CONFIG_PATH`,
//! then `config/socklink.yaml`).

use anyhow::{Context, Result};
use socklink_probe::bin_common::{
    init_tracing, load_config_from_env, parse_args, stop_or_warn, BinaryRunner, ConfigType,
    RunConfig, ShutdownManager,
};
use socklink_probe::socklink::{ConnectionManager, ManagerConfig, ManagerEvent, ManagerEventKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

struct Probe {
    config: RunConfig,
    manager: ConnectionManager,
    shutdown: ShutdownManager,
    transitions: Arc<AtomicUsize>,
}

impl Probe {
    fn new(manager_config: ManagerConfig, shutdown: ShutdownManager) -> Result<Self> {
        let manager = ConnectionManager::new(manager_config)
            .context("Failed to create connection manager")?;

        let transitions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&transitions);
        manager.on(ManagerEventKind::StatusChanged, move |event| {
            if let ManagerEvent::StatusChanged(change) = event {
                counter.fetch_add(1, Ordering::Relaxed);
                info!("Status {} -> {}", change.previous, change.to);
            }
        });

        Ok(Self {
            config: RunConfig::new("socklink_probe"),
            manager,
            shutdown,
            transitions,
        })
    }
}

impl BinaryRunner for Probe {
    async fn run(&mut self) -> Result<()> {
        if let Err(e) = self.manager.start().await {
            // the transport keeps retrying when reconnection is enabled
            warn!("Initial start failed: {}", e);
        }

        while self.shutdown.is_running() {
            self.shutdown
                .interruptible_sleep(self.config.heartbeat())
                .await;
            info!(
                manager = self.manager.label(),
                status = %self.manager.status(),
                "heartbeat"
            );
        }

        stop_or_warn(&self.manager)
            .await
            .context("Failed to stop connection manager")
    }

    fn config(&self) -> &RunConfig {
        &self.config
    }

    fn stats(&self) -> Option<String> {
        Some(format!(
            "{} status transitions observed",
            self.transitions.load(Ordering::Relaxed)
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config_path = load_config_from_env(ConfigType::from_args(&parse_args()));
    info!("Loading config from {}", config_path.display());
    let manager_config = ManagerConfig::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    let mut probe = Probe::new(manager_config, shutdown)?;
    probe.execute().await
}
