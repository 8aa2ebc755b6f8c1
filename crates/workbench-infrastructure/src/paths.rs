//! Unified path management for workbench files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/aws-workbench/     # Base directory (platform config dir)
//! ├── config.toml              # WorkbenchConfig
//! └── state/                   # JsonFileStorage base directory
//!     └── TreeState.json       # Persisted forest
//! ```

use std::path::{Path, PathBuf};
use workbench_core::error::{Result, WorkbenchError};

const APP_DIR_NAME: &str = "aws-workbench";

/// Resolves every file location from one base directory.
#[derive(Debug, Clone)]
pub struct WorkbenchPaths {
    base_dir: PathBuf,
}

impl WorkbenchPaths {
    /// Uses `base_dir` when given (tests, `--base-dir`), otherwise the
    /// platform configuration directory.
    pub fn new(base_dir: Option<&Path>) -> Result<Self> {
        let base_dir = match base_dir {
            Some(dir) => dir.to_path_buf(),
            None => dirs::config_dir()
                .ok_or_else(|| WorkbenchError::config("Cannot find config directory"))?
                .join(APP_DIR_NAME),
        };
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.toml")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.base_dir.join("state")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_under_custom_base_dir() {
        let paths = WorkbenchPaths::new(Some(Path::new("/tmp/awb"))).unwrap();
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/awb/config.toml"));
        assert_eq!(paths.state_dir(), PathBuf::from("/tmp/awb/state"));
    }
}
