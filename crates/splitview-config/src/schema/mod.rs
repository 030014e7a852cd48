//! Configuration schema types for splitview.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod logging;
mod persistence;
mod popup;
mod reconcile;

pub use logging::*;
pub use persistence::*;
pub use popup::*;
pub use reconcile::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct SplitviewConfig {
    pub popup: PopupConfig,
    pub reconcile: ReconcileConfig,
    pub persistence: PersistenceConfig,
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config: SplitviewConfig = toml::from_str("").unwrap();
        assert_eq!(config.popup.inset_top, 40);
        assert_eq!(config.popup.hide_strategy, HideStrategy::Cover);
        assert!(config.persistence.enabled);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: SplitviewConfig = toml::from_str(
            r#"
[popup]
gap = 6

[reconcile]
bounds_debounce_ms = 250
"#,
        )
        .unwrap();
        assert_eq!(config.popup.gap, 6);
        assert_eq!(config.popup.min_height, 100);
        assert_eq!(config.reconcile.bounds_debounce_ms, 250);
        assert_eq!(config.reconcile.self_move_guard_ms, 500);
    }

    #[test]
    fn unknown_sections_are_ignored() {
        let config: SplitviewConfig = toml::from_str(
            r#"
[theme]
name = "dark"
"#,
        )
        .unwrap();
        assert_eq!(config.popup.inset_top, 40);
    }
}
