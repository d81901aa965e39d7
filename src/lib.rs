//! socklink probe - Main Library
//!
//! Wiring around the `socklink` connection manager for binaries.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, logging,
//!   shutdown, runners)
//! - **socklink**: Connection lifecycle library (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use socklink_probe::bin_common::{load_config_from_env, ConfigType};
//! use socklink_probe::socklink::ConnectionManager;
//! ```

// Re-export workspace libraries for convenience
pub use socklink;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod logging;
    pub mod runner;
    pub mod shutdown;

    pub use cli::{load_config_from_env, parse_args, ConfigType};
    pub use logging::init_tracing;
    pub use runner::{BinaryRunner, RunConfig};
    pub use shutdown::{stop_or_warn, ShutdownManager};
}
