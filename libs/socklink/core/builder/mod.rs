pub mod states;

use crate::config::{ManagerConfig, TransportConfig, DEFAULT_TIMEOUT_MS};
use crate::manager::ConnectionManager;
use crate::traits::*;
use states::*;
use std::sync::Arc;
use std::time::Duration;

/// Type-state builder for [`ConnectionManager`]
///
/// `build()` only exists once a server address is set. Without an explicit
/// transport, the manager gets a [`WsTransport`](crate::WsTransport).
pub struct ConnectionManagerBuilder<A: AddressState> {
    _state: TypeState<A>,
    server_address: Option<String>,
    timeout: Duration,
    label: Option<String>,
    transport_config: TransportConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl ConnectionManagerBuilder<NoAddress> {
    /// Create a new builder instance
    pub fn new() -> Self {
        Self {
            _state: TypeState::new(),
            server_address: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            label: None,
            transport_config: TransportConfig::default(),
            transport: None,
        }
    }

    pub fn server_address(self, address: impl Into<String>) -> ConnectionManagerBuilder<HasAddress> {
        ConnectionManagerBuilder {
            _state: TypeState::new(),
            server_address: Some(address.into()),
            timeout: self.timeout,
            label: self.label,
            transport_config: self.transport_config,
            transport: self.transport,
        }
    }
}

impl Default for ConnectionManagerBuilder<NoAddress> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: AddressState> ConnectionManagerBuilder<A> {
    /// Default timeout for `start` and `stop`
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Name used in this manager's log lines (defaults to the address)
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Options for the transport
    pub fn transport_config(mut self, config: TransportConfig) -> Self {
        self.transport_config = config;
        self
    }

    /// Use this transport instead of creating a WebSocket one
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl ConnectionManagerBuilder<HasAddress> {
    /// The configuration `build()` will use
    pub fn config(&self) -> ManagerConfig {
        ManagerConfig {
            server_address: self.server_address.clone().unwrap_or_default(),
            timeout_ms: self.timeout.as_millis() as u64,
            label: self.label.clone(),
            transport: self.transport_config.clone(),
        }
    }

    /// Build the manager
    ///
    /// # Errors
    /// Only when creating the default WebSocket transport fails.
    pub fn build(self) -> Result<ConnectionManager> {
        let config = self.config();
        match self.transport {
            Some(transport) => Ok(ConnectionManager::with_transport(config, transport)),
            None => ConnectionManager::new(config),
        }
    }
}
