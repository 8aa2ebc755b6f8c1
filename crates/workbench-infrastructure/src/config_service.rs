//! Loads `config.toml`.

use std::fs;
use std::path::Path;
use workbench_core::config::WorkbenchConfig;
use workbench_core::error::Result;

/// Reads the workbench configuration.
pub struct ConfigService;

impl ConfigService {
    /// Parses the config file; a missing or empty file yields the defaults.
    /// Parse errors are returned, not logged; logging is not set up yet.
    pub fn load(path: &Path) -> Result<WorkbenchConfig> {
        if !path.exists() {
            return Ok(WorkbenchConfig::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::WorkbenchPaths;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkbenchPaths::new(Some(temp_dir.path())).unwrap();
        assert_eq!(
            ConfigService::load(&paths.config_file()).unwrap(),
            WorkbenchConfig::default()
        );
    }

    #[test]
    fn test_reads_tree_state_section() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkbenchPaths::new(Some(temp_dir.path())).unwrap();
        fs::write(
            paths.config_file(),
            "[tree_state]\nstorage_key = \"Favorites\"\ndebounce_ms = 100\n",
        )
        .unwrap();

        let config = ConfigService::load(&paths.config_file()).unwrap();
        assert_eq!(config.tree_state.storage_key, "Favorites");
        assert_eq!(config.tree_state.debounce_ms, 100);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkbenchPaths::new(Some(temp_dir.path())).unwrap();
        fs::write(paths.config_file(), "tree_state = 3").unwrap();

        let err = ConfigService::load(&paths.config_file()).unwrap_err();
        assert!(err.is_persistence());
    }
}
