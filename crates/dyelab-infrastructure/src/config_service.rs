//! Configuration loading.
//!
//! Reads [`AppConfig`] from a TOML file and layers environment overrides on
//! top:
//!
//! | variable | overrides |
//! |---|---|
//! | `DYELAB_MODEL_PATH` | `model.path` |
//! | `OPENAI_API_KEY` | `extractor.api_key` |
//! | `OPENAI_MODEL_NAME` | `extractor.model_name` |
//! | `OPENAI_BASE_URL` | `extractor.base_url` |

use std::path::{Path, PathBuf};

use dyelab_core::config::{AppConfig, ModelConfig};
use dyelab_core::error::{DyelabError, Result};

use crate::paths::{DyelabPaths, expand_home};

pub const ENV_MODEL_PATH: &str = "DYELAB_MODEL_PATH";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_MODEL_NAME: &str = "OPENAI_MODEL_NAME";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

pub struct ConfigService;

impl ConfigService {
    /// Loads the configuration and applies process environment overrides.
    ///
    /// With an explicit `path` the file must exist. Without one, the default
    /// location is used if present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<AppConfig> {
        let mut config = match path {
            Some(path) => Self::load_file(path)?,
            None => Self::load_default()?,
        };
        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_default() -> Result<AppConfig> {
        let path = match DyelabPaths::config_file() {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("[Config] {}; using defaults", e);
                return Ok(AppConfig::default());
            }
        };
        if !path.exists() {
            tracing::debug!("[Config] No config at {}; using defaults", path.display());
            return Ok(AppConfig::default());
        }
        Self::load_file(&path)
    }

    pub fn load_file(path: &Path) -> Result<AppConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DyelabError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        tracing::info!("[Config] Loaded {}", path.display());
        Ok(config)
    }

    /// Applies environment overrides read through `lookup`. Empty values are
    /// ignored.
    pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = lookup(ENV_MODEL_PATH) {
            config.model.path = Some(PathBuf::from(path));
        }
        if let Some(key) = lookup(ENV_OPENAI_API_KEY) {
            config.extractor.api_key = Some(key);
        }
        if let Some(model) = lookup(ENV_OPENAI_MODEL_NAME) {
            config.extractor.model_name = model;
        }
        if let Some(url) = lookup(ENV_OPENAI_BASE_URL) {
            config.extractor.base_url = url;
        }
    }

    /// The model artifact path: the configured one with `~` expanded, or the
    /// default file in the data directory.
    pub fn resolve_model_path(model: &ModelConfig) -> Result<PathBuf> {
        match &model.path {
            Some(path) => Ok(expand_home(path)),
            None => DyelabPaths::default_model_file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dyelab_core::config::ExtractorKind;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_load_file_reads_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[extractor]\nkind = \"openai\"\n\n[session]\nttl_secs = 60\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = ConfigService::load_file(file.path()).unwrap();

        assert_eq!(config.extractor.kind, ExtractorKind::OpenAi);
        assert_eq!(config.session.ttl_secs, 60);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigService::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, DyelabError::Config(_)));
    }

    #[test]
    fn test_malformed_toml_is_a_serialization_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session\nttl_secs = ").unwrap();

        let err = ConfigService::load_file(file.path()).unwrap_err();

        assert!(matches!(err, DyelabError::Serialization { ref format, .. } if format == "TOML"));
    }

    #[test]
    fn test_env_overrides_win_over_file() {
        let mut config = AppConfig::default();
        config.extractor.api_key = Some("from-file".to_string());
        let env: HashMap<&str, &str> = [
            (ENV_MODEL_PATH, "/tmp/model.json"),
            (ENV_OPENAI_API_KEY, "from-env"),
            (ENV_OPENAI_BASE_URL, "  "),
        ]
        .into_iter()
        .collect();

        ConfigService::apply_env_overrides(&mut config, |key| {
            env.get(key).map(|v| v.to_string())
        });

        assert_eq!(config.model.path, Some(PathBuf::from("/tmp/model.json")));
        assert_eq!(config.extractor.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.extractor.base_url, AppConfig::default().extractor.base_url);
    }

    #[test]
    fn test_configured_model_path_is_used() {
        let model = ModelConfig {
            path: Some(PathBuf::from("/srv/colour.json")),
        };
        assert_eq!(
            ConfigService::resolve_model_path(&model).unwrap(),
            PathBuf::from("/srv/colour.json")
        );
    }
}
