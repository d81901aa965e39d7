//! CLI utilities for binaries
//!
//! Resolves which configuration file a binary loads.

use std::path::PathBuf;

/// Type of configuration to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Probe configuration (config/socklink.yaml)
    Probe,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    /// Get the default path for this config type
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::Probe => "config/socklink.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    /// Get the environment variable name for this config type
    pub fn env_var_name(&self) -> &str {
        "SOCKLINK_CONFIG_PATH"
    }

    /// First positional argument wins, otherwise the probe default
    pub fn from_args(args: &[String]) -> Self {
        match args.first() {
            Some(path) => ConfigType::Custom(path.clone()),
            None => ConfigType::Probe,
        }
    }
}

/// Load configuration path from environment or use default
///
/// # Examples
/// ```
/// use socklink_probe::bin_common::{load_config_from_env, ConfigType};
///
/// let path = load_config_from_env(ConfigType::Probe);
/// ```
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    if let ConfigType::Custom(path) = &config_type {
        return PathBuf::from(path);
    }

    std::env::var(config_type.env_var_name())
        .unwrap_or_else(|_| config_type.default_path().to_string())
        .into()
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}
