//! Connection status and its lock-free storage

use crate::traits::{Result, SockLinkError};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::error;

/// The manager's three-valued view of connectivity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Connected,
    Connecting,
    Disconnected,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Connected, Status::Connecting, Status::Disconnected];

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Connected => "connected",
            Status::Connecting => "connecting",
            Status::Disconnected => "disconnected",
        }
    }

    #[inline]
    fn as_u8(self) -> u8 {
        match self {
            Status::Disconnected => 0,
            Status::Connecting => 1,
            Status::Connected => 2,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for Status {
    type Error = SockLinkError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Status::Disconnected),
            1 => Ok(Status::Connecting),
            2 => Ok(Status::Connected),
            other => {
                error!(status = other, "Invalid status encoding");
                Err(SockLinkError::InvalidStatus(other.to_string()))
            }
        }
    }
}

impl FromStr for Status {
    type Err = SockLinkError;

    fn from_str(s: &str) -> Result<Self> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                error!(status = s, "Invalid status");
                SockLinkError::InvalidStatus(s.to_string())
            })
    }
}

/// Payload of a `StatusChanged` event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub previous: Status,
    pub to: Status,
}

/// Status cell readable from any thread without locking
///
/// Only [`Status`] values are ever stored, so reads always decode.
#[derive(Debug)]
pub struct AtomicStatus(AtomicU8);

impl AtomicStatus {
    pub fn new(status: Status) -> Self {
        Self(AtomicU8::new(status.as_u8()))
    }

    #[inline]
    pub fn get(&self) -> Status {
        Status::try_from(self.0.load(Ordering::Acquire)).unwrap_or(Status::Disconnected)
    }

    /// Store `status`, returning the value it replaced
    #[inline]
    pub fn swap(&self, status: Status) -> Status {
        Status::try_from(self.0.swap(status.as_u8(), Ordering::AcqRel))
            .unwrap_or(Status::Disconnected)
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.get() == Status::Connected
    }

    #[inline]
    pub fn is_connecting(&self) -> bool {
        self.get() == Status::Connecting
    }

    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.get() == Status::Disconnected
    }
}

impl Default for AtomicStatus {
    fn default() -> Self {
        Self::new(Status::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_names_parse_back() {
        for status in Status::ALL {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
            assert_eq!(status.to_string(), status.as_str());
        }
    }

    #[test]
    fn test_unknown_status_name_is_rejected() {
        let err = "reconnecting".parse::<Status>().unwrap_err();
        assert!(matches!(err, SockLinkError::InvalidStatus(ref s) if s == "reconnecting"));

        // Names are case sensitive
        assert!("CONNECTED".parse::<Status>().is_err());
    }

    #[test]
    fn test_unknown_status_byte_is_rejected() {
        assert!(matches!(Status::try_from(3), Err(SockLinkError::InvalidStatus(_))));
        assert_eq!(Status::try_from(2).unwrap(), Status::Connected);
    }

    #[test]
    fn test_atomic_status_swap() {
        let status = AtomicStatus::default();
        assert!(status.is_disconnected());

        assert_eq!(status.swap(Status::Connecting), Status::Disconnected);
        assert!(status.is_connecting());

        assert_eq!(status.swap(Status::Connected), Status::Connecting);
        assert!(status.is_connected());
        assert!(!status.is_connecting());
        assert!(!status.is_disconnected());
    }
}
