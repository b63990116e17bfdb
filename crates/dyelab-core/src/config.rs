//! Application configuration model.
//!
//! Every section is optional in the TOML file; missing sections and keys fall
//! back to the defaults below. Loading and environment overrides live in the
//! infrastructure crate.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub extractor: ExtractorConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the JSON model artifact. `None` means the platform data dir.
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    #[default]
    RuleBased,
    #[serde(rename = "openai")]
    OpenAi,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExtractorConfig {
    pub kind: ExtractorKind,
    pub model_name: String,
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            kind: ExtractorKind::default(),
            model_name: DEFAULT_OPENAI_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle time after which a session is dropped.
    pub ttl_secs: u64,
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.extractor.kind, ExtractorKind::RuleBased);
        assert_eq!(config.session.ttl(), Duration::from_secs(1800));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [model]
            path = "/srv/models/colour.json"

            [extractor]
            kind = "openai"
            model_name = "gpt-4o-mini"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.model.path,
            Some(PathBuf::from("/srv/models/colour.json"))
        );
        assert_eq!(config.extractor.kind, ExtractorKind::OpenAi);
        assert_eq!(config.extractor.model_name, "gpt-4o-mini");
        assert_eq!(config.extractor.base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(config.session.ttl_secs, DEFAULT_SESSION_TTL_SECS);
    }

    #[test]
    fn test_unknown_extractor_kind_is_rejected() {
        let result: std::result::Result<AppConfig, _> =
            toml::from_str("[extractor]\nkind = \"telepathy\"\n");
        assert!(result.is_err());
    }
}
