//! Controller snapshot persistence.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub enabled: bool,
    /// Snapshot file override. Defaults to
    /// `<data_dir>/splitview/controllers.json`.
    pub path: Option<PathBuf>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl PersistenceConfig {
    /// The snapshot file to use, if one can be determined.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("splitview").join("controllers.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let config = PersistenceConfig {
            enabled: true,
            path: Some(PathBuf::from("/tmp/snap.json")),
        };
        assert_eq!(config.resolved_path(), Some(PathBuf::from("/tmp/snap.json")));
    }

    #[test]
    fn default_path_is_reasonable() {
        if let Some(path) = PersistenceConfig::default().resolved_path() {
            assert!(path.ends_with("splitview/controllers.json"));
        }
    }
}
