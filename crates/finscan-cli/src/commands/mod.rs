//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod output;
pub mod process;
pub mod schema;

use std::path::{Path, PathBuf};

use finscan_core::FinscanConfig;
use tracing::debug;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("finscan")
        .join("config.json")
}

/// The `-c` path if given, otherwise the default location.
pub fn resolve_config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration.
///
/// An explicit path must exist; a missing default file means defaults.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<FinscanConfig> {
    match explicit {
        Some(path) => Ok(FinscanConfig::from_file(Path::new(path))?),
        None => {
            let path = default_config_path();
            if path.exists() {
                debug!("Loading config from {}", path.display());
                Ok(FinscanConfig::from_file(&path)?)
            } else {
                Ok(FinscanConfig::default())
            }
        }
    }
}
