//! # socklink core
//!
//! Building blocks the connection manager is assembled from:
//!
//! - **status**: the three-valued [`Status`] and its lock-free cell
//! - **emitter**: ordered, synchronous listener registry
//! - **config**: manager and transport options, YAML loading
//! - **builder**: type-state builder for [`ConnectionManager`](crate::ConnectionManager)
//! - **ws_transport**: the bundled WebSocket [`Transport`](crate::Transport)

pub mod builder;
pub mod config;
pub mod emitter;
pub mod status;
pub mod ws_transport;

pub use builder::{states, ConnectionManagerBuilder};
pub use config::{ConfigError, ManagerConfig, TransportConfig, TransportKind};
pub use emitter::{Event, EventEmitter, Listener, ListenerId};
pub use status::{AtomicStatus, Status, StatusChange};
pub use ws_transport::WsTransport;

/// Create a new connection manager builder
///
/// # Example
/// ```ignore
/// let manager = socklink::builder()
///     .server_address("ws://127.0.0.1:3000")
///     .transport_config(TransportConfig { reconnection: false, ..Default::default() })
///     .build()?;
/// ```
pub fn builder() -> ConnectionManagerBuilder<builder::states::NoAddress> {
    ConnectionManagerBuilder::new()
}
