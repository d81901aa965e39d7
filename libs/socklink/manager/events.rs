use crate::core::emitter::Event;
use crate::core::status::{Status, StatusChange};

/// Events published by a [`ConnectionManager`](super::ConnectionManager)
///
/// The three status events carry no payload; `StatusChanged` follows each
/// of them with the transition that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerEvent {
    Connected,
    Connecting,
    Disconnected,
    StatusChanged(StatusChange),
}

/// Listener key for [`ManagerEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagerEventKind {
    Connected,
    Connecting,
    Disconnected,
    StatusChanged,
}

impl ManagerEvent {
    /// The status-specific event announcing `status`
    pub fn for_status(status: Status) -> Self {
        match status {
            Status::Connected => ManagerEvent::Connected,
            Status::Connecting => ManagerEvent::Connecting,
            Status::Disconnected => ManagerEvent::Disconnected,
        }
    }
}

impl Event for ManagerEvent {
    type Kind = ManagerEventKind;

    fn kind(&self) -> ManagerEventKind {
        match self {
            ManagerEvent::Connected => ManagerEventKind::Connected,
            ManagerEvent::Connecting => ManagerEventKind::Connecting,
            ManagerEvent::Disconnected => ManagerEventKind::Disconnected,
            ManagerEvent::StatusChanged(_) => ManagerEventKind::StatusChanged,
        }
    }
}
