//! # socklink
//!
//! Connection lifecycle management for real-time sockets.
//!
//! A [`ConnectionManager`] wraps one [`Transport`] and keeps a three-valued
//! status (`Disconnected` / `Connecting` / `Connected`) in step with the
//! transport's lifecycle events. On top of that it offers:
//!
//! - **Idempotent start/stop**: overlapping calls never double-connect
//! - **Timeouts**: every `start`/`stop` is bounded
//! - **Status events**: ordered, synchronous observers for each transition
//! - **Pluggable transports**: a WebSocket transport is bundled; anything
//!   implementing [`Transport`] can be driven instead

pub mod core;
pub mod manager;
pub mod traits;

// Re-export all traits
pub use traits::*;

// Re-export core functionality
pub use crate::core::{
    builder, config, emitter, status, ws_transport,
    builder::{states, ConnectionManagerBuilder},
    config::{ConfigError, ManagerConfig, TransportConfig, TransportKind},
    emitter::{Event, EventEmitter, ListenerId},
    status::{Status, StatusChange},
    ws_transport::WsTransport,
};

// Re-export manager
pub use manager::{
    ConnectionManager, LifecycleOptions, ManagerEvent, ManagerEventKind, TimeoutPolicy,
    BACKOFF_WAIT,
};
