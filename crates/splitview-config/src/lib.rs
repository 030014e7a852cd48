//! Splitview configuration system.
//!
//! TOML-based configuration for popup tiling, event reconciliation,
//! persistence and logging. All sections use defaults so partial configs
//! work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use splitview_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod schema;
pub mod toml_loader;
pub mod toml_writer;
pub mod validation;

pub use schema::{SplitviewConfig, CONFIG_SCHEMA_VERSION};
pub use toml_writer::{save_config, save_config_to_path};

use splitview_common::ConfigError;

/// Load config from the platform default path and validate it.
///
/// Creates a default `config.toml` if none exists yet.
pub fn load_config() -> Result<SplitviewConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &SplitviewConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
