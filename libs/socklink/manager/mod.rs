//! # socklink manager
//!
//! The connection lifecycle state machine and its event surface.

pub mod events;
pub mod manager;

pub use events::{ManagerEvent, ManagerEventKind};
pub use manager::{ConnectionManager, LifecycleOptions, TimeoutPolicy, BACKOFF_WAIT};
