use crate::traits::{ExponentialBackoff, NeverReconnect, ReconnectionStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Environment variable that overrides `server_address` when loading YAML
pub const SERVER_ADDRESS_ENV: &str = "SOCKLINK_SERVER_ADDRESS";

/// Default timeout for `start`/`stop` and for a single connection attempt
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Low-level transport mechanisms a socket may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Websocket,
    Polling,
}

/// Options handed to the transport
///
/// Every field has a default, so a partial YAML block or
/// `TransportConfig { reconnection: false, ..Default::default() }`
/// yields a fresh, fully-populated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Connect as soon as the transport is created
    pub auto_connect: bool,
    /// Timeout for a single connection attempt
    pub timeout_ms: u64,
    /// Allowed transport mechanisms, in preference order
    pub transports: Vec<TransportKind>,
    /// Reconnect automatically after an unexpected disconnect
    pub reconnection: bool,
    /// Give up after this many reconnection attempts (None = never)
    pub reconnection_attempts: Option<usize>,
    pub reconnection_delay_ms: u64,
    pub reconnection_delay_max_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            auto_connect: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            transports: vec![TransportKind::Websocket],
            reconnection: true,
            reconnection_attempts: None,
            reconnection_delay_ms: 1000,
            reconnection_delay_max_ms: 5000,
        }
    }
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn reconnection_delay(&self) -> Duration {
        Duration::from_millis(self.reconnection_delay_ms)
    }

    pub fn reconnection_delay_max(&self) -> Duration {
        Duration::from_millis(self.reconnection_delay_max_ms)
    }

    /// Check if a transport mechanism is allowed
    pub fn allows(&self, kind: TransportKind) -> bool {
        self.transports.contains(&kind)
    }

    /// Build the reconnection strategy these options describe
    pub fn reconnect_strategy(&self) -> Box<dyn ReconnectionStrategy> {
        if self.reconnection {
            Box::new(ExponentialBackoff::new(
                self.reconnection_delay(),
                self.reconnection_delay_max(),
                self.reconnection_attempts,
            ))
        } else {
            Box::new(NeverReconnect)
        }
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "transport.timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.transports.is_empty() {
            return Err(ConfigError::ValidationError(
                "transport.transports must list at least one transport".to_string(),
            ));
        }

        if self.reconnection_delay_ms > self.reconnection_delay_max_ms {
            return Err(ConfigError::ValidationError(format!(
                "transport.reconnection_delay_ms ({}) exceeds reconnection_delay_max_ms ({})",
                self.reconnection_delay_ms, self.reconnection_delay_max_ms
            )));
        }

        Ok(())
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Configuration for a [`ConnectionManager`](crate::ConnectionManager)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Address of the socket server (e.g. `ws://127.0.0.1:3000`)
    pub server_address: String,

    /// Default timeout for `start` and `stop`
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Name attached to this manager's log lines
    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub transport: TransportConfig,
}

impl ManagerConfig {
    pub fn new(server_address: impl Into<String>) -> Self {
        Self {
            server_address: server_address.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            label: None,
            transport: TransportConfig::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from a YAML file
    ///
    /// `SOCKLINK_SERVER_ADDRESS`, when set, replaces the file's address.
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config = Self::from_yaml(&yaml_content)?;

        if let Ok(address) = std::env::var(SERVER_ADDRESS_ENV) {
            info!("Overriding server address from environment variable");
            config.server_address = address;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string (no env override, no validation)
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server_address.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server_address must not be empty".to_string(),
            ));
        }

        if self.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }

        self.transport.validate()
    }
}
