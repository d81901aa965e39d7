use crate::core::emitter::{Event, EventEmitter};
use std::fmt;

/// Lifecycle events reported by a transport
///
/// Named after the socket.io client events they mirror. Attempt numbers
/// start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The socket is open
    Connect,
    /// The initial connection attempt failed
    ConnectError(String),
    /// The socket closed (reason)
    Disconnect(String),
    /// A reconnection attempt succeeded
    Reconnect(usize),
    /// A reconnection attempt is about to be made
    ReconnectAttempt(usize),
    /// The transport is waiting to reconnect
    Reconnecting(usize),
    /// A reconnection attempt failed
    ReconnectError(String),
    /// The reconnection strategy gave up
    ReconnectFailed,
    /// Any other transport error
    Error(String),
}

/// Listener key for [`TransportEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportEventKind {
    Connect,
    ConnectError,
    Disconnect,
    Reconnect,
    ReconnectAttempt,
    Reconnecting,
    ReconnectError,
    ReconnectFailed,
    Error,
}

impl TransportEventKind {
    /// socket.io event name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportEventKind::Connect => "connect",
            TransportEventKind::ConnectError => "connect_error",
            TransportEventKind::Disconnect => "disconnect",
            TransportEventKind::Reconnect => "reconnect",
            TransportEventKind::ReconnectAttempt => "reconnect_attempt",
            TransportEventKind::Reconnecting => "reconnecting",
            TransportEventKind::ReconnectError => "reconnect_error",
            TransportEventKind::ReconnectFailed => "reconnect_failed",
            TransportEventKind::Error => "error",
        }
    }
}

impl fmt::Display for TransportEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Event for TransportEvent {
    type Kind = TransportEventKind;

    fn kind(&self) -> TransportEventKind {
        match self {
            TransportEvent::Connect => TransportEventKind::Connect,
            TransportEvent::ConnectError(_) => TransportEventKind::ConnectError,
            TransportEvent::Disconnect(_) => TransportEventKind::Disconnect,
            TransportEvent::Reconnect(_) => TransportEventKind::Reconnect,
            TransportEvent::ReconnectAttempt(_) => TransportEventKind::ReconnectAttempt,
            TransportEvent::Reconnecting(_) => TransportEventKind::Reconnecting,
            TransportEvent::ReconnectError(_) => TransportEventKind::ReconnectError,
            TransportEvent::ReconnectFailed => TransportEventKind::ReconnectFailed,
            TransportEvent::Error(_) => TransportEventKind::Error,
        }
    }
}

/// The socket a [`ConnectionManager`](crate::ConnectionManager) drives
///
/// Commands are fire-and-forget: their outcome is reported later through
/// [`Transport::events`]. A transport owns its handshake, timeouts and
/// reconnection schedule; the manager only reacts to what it reports.
///
/// Implementations may emit from any thread, and may emit synchronously
/// from inside `connect`/`disconnect`.
pub trait Transport: Send + Sync + 'static {
    /// Open the connection (no-op if already open or opening)
    fn connect(&self);

    /// Close the connection and stop any reconnection in progress
    fn disconnect(&self);

    /// Registry the transport publishes its lifecycle events on
    fn events(&self) -> &EventEmitter<TransportEvent>;
}
