//! Unified path management for dyelab files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/dyelab/              # Config directory
//! └── config.toml                # Application configuration
//!
//! ~/.local/share/dyelab/         # Data directory
//! └── colour_predictor.json      # Default model artifact
//! ```

use std::path::{Path, PathBuf};

use dyelab_core::error::{DyelabError, Result};

const APP_DIR: &str = "dyelab";
const CONFIG_FILE: &str = "config.toml";
const MODEL_FILE: &str = "colour_predictor.json";

pub struct DyelabPaths;

impl DyelabPaths {
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| DyelabError::config("Cannot determine the config directory"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| DyelabError::config("Cannot determine the data directory"))
    }

    /// `~/.config/dyelab/config.toml` on Linux.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// `~/.local/share/dyelab/colour_predictor.json` on Linux.
    pub fn default_model_file() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join(MODEL_FILE))
    }
}

/// Expands a leading `~/` to the home directory. Other paths are returned
/// unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_files_live_under_app_dir() {
        if let Ok(config) = DyelabPaths::config_file() {
            assert!(config.ends_with("dyelab/config.toml"));
        }
        if let Ok(model) = DyelabPaths::default_model_file() {
            assert!(model.ends_with("dyelab/colour_predictor.json"));
        }
    }

    #[test]
    fn test_expand_home_leaves_absolute_paths() {
        let path = Path::new("/srv/models/colour.json");
        assert_eq!(expand_home(path), path);
    }

    #[test]
    fn test_expand_home_replaces_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_home(Path::new("~/models/colour.json")),
                home.join("models/colour.json")
            );
        }
    }
}
