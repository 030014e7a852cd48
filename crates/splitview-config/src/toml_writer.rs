//! Write SplitviewConfig to TOML on disk.
//!
//! Writes go to a `.tmp` sibling first and are renamed into place.

use std::path::Path;

use splitview_common::ConfigError;

use crate::schema::SplitviewConfig;
use crate::toml_loader::default_config_path;

/// Write config to the platform default path.
pub fn save_config(config: &SplitviewConfig) -> Result<(), ConfigError> {
    let path = default_config_path()?;
    save_config_to_path(config, &path)
}

/// Write config to a specific path, creating parent directories as needed.
pub fn save_config_to_path(config: &SplitviewConfig, path: &Path) -> Result<(), ConfigError> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ConfigError::ParseError(format!("failed to serialize config to TOML: {e}")))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, &toml_str).map_err(|e| {
        ConfigError::ParseError(format!(
            "failed to write config to {}: {e}",
            tmp_path.display()
        ))
    })?;

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        tracing::warn!("atomic rename failed ({}), falling back to direct write", e);
        std::fs::write(path, &toml_str).map_err(|e2| {
            ConfigError::ParseError(format!(
                "failed to write config to {}: {e2}",
                path.display()
            ))
        })?;
    }

    tracing::debug!(path = %path.display(), "config saved to disk");
    Ok(())
}
