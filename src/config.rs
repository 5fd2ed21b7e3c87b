//! Locations used by the default collaborators.

use std::path::{Path, PathBuf};

/// Environment variable pointing at the hosted tool cache.
pub const TOOL_CACHE_ENV: &str = "RUNNER_TOOL_CACHE";
/// Environment variable pointing at the runner's scratch directory.
pub const TEMP_DIR_ENV: &str = "RUNNER_TEMP";

const CACHE_NAMESPACE: &str = "setup-chrome";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerConfig {
    /// Root of the on-disk tool cache.
    pub tool_cache_root: PathBuf,
    /// Directory that receives downloaded archives and extracted trees.
    pub temp_dir: PathBuf,
}

impl InstallerConfig {
    /// Resolves both directories from the environment.
    ///
    /// `RUNNER_TOOL_CACHE` and `RUNNER_TEMP` take priority; otherwise the user
    /// cache directory and the system temp directory are used.
    pub fn from_env() -> Self {
        let temp_dir = non_empty_var(TEMP_DIR_ENV).unwrap_or_else(std::env::temp_dir);
        let tool_cache_root = non_empty_var(TOOL_CACHE_ENV)
            .or_else(dirs::cache_dir)
            .map(|base| base.join(CACHE_NAMESPACE))
            .unwrap_or_else(|| temp_dir.join(CACHE_NAMESPACE).join("cache"));

        InstallerConfig {
            tool_cache_root,
            temp_dir,
        }
    }

    pub fn with_tool_cache_root(mut self, root: impl AsRef<Path>) -> Self {
        self.tool_cache_root = root.as_ref().to_path_buf();
        self
    }

    pub fn with_temp_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.temp_dir = dir.as_ref().to_path_buf();
        self
    }
}

impl Default for InstallerConfig {
    fn default() -> Self {
        InstallerConfig::from_env()
    }
}

fn non_empty_var(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
