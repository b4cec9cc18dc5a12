//! Application paths for config and session data.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const ENV_DATA_DIR: &str = "KOLGATE_DATA_DIR";

/// Application paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Configuration directory.
    pub config: PathBuf,
    /// Data directory (persisted session state).
    pub data: PathBuf,
}

impl AppPaths {
    /// Create paths for the kolgate application.
    ///
    /// `KOLGATE_DATA_DIR` replaces the platform data directory.
    #[must_use]
    pub fn new() -> Self {
        let mut paths = ProjectDirs::from("io", "kolgate", "kolgate").map_or_else(
            || {
                let home = directories::BaseDirs::new()
                    .map_or_else(|| PathBuf::from("."), |d| d.home_dir().to_path_buf());
                Self {
                    config: home.join(".config/kolgate"),
                    data: home.join(".local/share/kolgate"),
                }
            },
            |proj_dirs| Self {
                config: proj_dirs.config_dir().to_path_buf(),
                data: proj_dirs.data_dir().to_path_buf(),
            },
        );

        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            if !dir.trim().is_empty() {
                paths.data = PathBuf::from(dir.trim());
            }
        }
        paths
    }

    /// Paths rooted in a single directory (tests, portable installs).
    #[must_use]
    pub fn under(root: &Path) -> Self {
        Self {
            config: root.join("config"),
            data: root.join("data"),
        }
    }

    /// Path to the config file.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }

    /// Directory holding one JSON file per session.
    #[must_use]
    pub fn sessions_dir(&self) -> PathBuf {
        self.data.join("sessions")
    }

}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
