//! Config path resolution and default file creation.

use splitview_common::ConfigError;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::schema::SplitviewConfig;
use crate::toml_writer::save_config_to_path;

/// Get the platform-specific default config file path.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))?;
    Ok(config_dir.join("splitview").join("config.toml"))
}

/// Write a default config file to `path`.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    save_config_to_path(&SplitviewConfig::default(), path)?;
    info!("created default config at {}", path.display());
    Ok(())
}
