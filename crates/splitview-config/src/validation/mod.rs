//! Full configuration validation.
//!
//! Each section has its own submodule; this orchestrator calls them all and
//! collects errors into a single `ConfigError`.

mod helpers;
mod popup;
mod reconcile;


use crate::schema::SplitviewConfig;
use splitview_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &SplitviewConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    popup::validate_popup(&mut errors, config);
    reconcile::validate_reconcile(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
