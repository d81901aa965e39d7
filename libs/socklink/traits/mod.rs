//! # socklink traits
//!
//! The seams of the crate:
//!
//! - **Transport**: the socket a manager drives, and the events it reports
//! - **ReconnectionStrategy**: how a transport schedules reconnection
//! - **SockLinkError**: the crate-wide error type

pub mod error;
pub mod reconnect;
pub mod transport;

pub use error::{Result, SockLinkError};
pub use reconnect::{ExponentialBackoff, NeverReconnect, ReconnectionStrategy};
pub use transport::{Transport, TransportEvent, TransportEventKind};
