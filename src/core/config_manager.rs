// src/core/config_manager.rs
//! Client configuration: defaults, optional YAML file, environment, CLI flags

use anyhow::{Context, Result};
use chrono::Locale;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

const DEFAULT_CONFIG_FILE: &str = "resume-dash.yaml";
const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_UPLOAD_FIELD: &str = "file";
const DEFAULT_DATE_LOCALE: &str = "en_US";
const DEFAULT_TIMEOUT_SECS: u64 = 400;

/// How the analysis service answers an upload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// The response body is the full analysis record
    #[default]
    Inline,
    /// The response carries an id to fetch from the analysis endpoint
    Reference,
}

impl FromStr for UploadMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "reference" | "navigate" => Ok(Self::Reference),
            other => anyhow::bail!("Unknown upload mode: {}. Use inline or reference", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// Multipart field name carrying the resume file
    pub upload_field: String,
    pub upload_mode: UploadMode,
    pub date_locale: String,
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            upload_field: DEFAULT_UPLOAD_FIELD.to_string(),
            upload_mode: UploadMode::default(),
            date_locale: DEFAULT_DATE_LOCALE.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Locale for upload dates, POSIX when the configured name is unknown
    pub fn locale(&self) -> Locale {
        parse_locale(&self.date_locale).unwrap_or_else(|| {
            warn!("Unknown date locale '{}', using POSIX", self.date_locale);
            Locale::POSIX
        })
    }
}

pub fn parse_locale(name: &str) -> Option<Locale> {
    Locale::try_from(name.trim().replace('-', "_").as_str()).ok()
}

/// Partial configuration; set fields override the layer below
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigOverlay {
    pub api_base_url: Option<String>,
    pub upload_field: Option<String>,
    pub upload_mode: Option<UploadMode>,
    pub date_locale: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl ConfigOverlay {
    pub fn apply(self, config: &mut ClientConfig) {
        if let Some(url) = self.api_base_url {
            config.api_base_url = url;
        }
        if let Some(field) = self.upload_field {
            config.upload_field = field;
        }
        if let Some(mode) = self.upload_mode {
            config.upload_mode = mode;
        }
        if let Some(locale) = self.date_locale {
            config.date_locale = locale;
        }
        if let Some(timeout) = self.timeout_seconds {
            config.timeout_seconds = timeout;
        }
    }

    /// Overlay read from `RESUME_API_URL`, `RESUME_UPLOAD_MODE`, `RESUME_DATE_LOCALE`
    pub fn from_env_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let upload_mode = lookup("RESUME_UPLOAD_MODE")
            .map(|raw| raw.parse::<UploadMode>())
            .transpose()
            .context("Invalid RESUME_UPLOAD_MODE")?;

        Ok(Self {
            api_base_url: lookup("RESUME_API_URL"),
            upload_mode,
            date_locale: lookup("RESUME_DATE_LOCALE"),
            ..Self::default()
        })
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: ConfigOverlay,
    #[serde(default)]
    production: ConfigOverlay,
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub client: ClientConfig,
}

impl ConfigManager {
    /// Load configuration; an explicit path must exist, the default file is optional
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let mut client = ClientConfig::default();

        let (config_path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::overlay_from_yaml(&content, &environment)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
                .apply(&mut client);
        } else if required {
            anyhow::bail!("Config file not found: {}", config_path.display());
        }

        ConfigOverlay::from_env_with(|key| std::env::var(key).ok())?.apply(&mut client);

        Ok(Self {
            environment,
            client,
        })
    }

    fn get_environment() -> String {
        std::env::var("RESUME_DASH_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    /// Pick the section of a YAML config file for an environment
    pub fn overlay_from_yaml(content: &str, environment: &str) -> Result<ConfigOverlay> {
        let file: ConfigFile = serde_yaml::from_str(content).context("Invalid YAML config")?;
        Ok(match environment {
            "production" => file.production,
            _ => file.local,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
local:
  api_base_url: http://127.0.0.1:5000
production:
  api_base_url: https://hr.example.com
  upload_mode: reference
  upload_field: resume
  date_locale: ru_RU
"#;

    #[test]
    fn test_yaml_section_selected_by_environment() {
        let mut config = ClientConfig::default();
        ConfigManager::overlay_from_yaml(YAML, "production")
            .unwrap()
            .apply(&mut config);
        assert_eq!(config.api_base_url, "https://hr.example.com");
        assert_eq!(config.upload_mode, UploadMode::Reference);
        assert_eq!(config.upload_field, "resume");
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECS);

        let mut config = ClientConfig::default();
        ConfigManager::overlay_from_yaml(YAML, "staging")
            .unwrap()
            .apply(&mut config);
        assert_eq!(config.api_base_url, "http://127.0.0.1:5000");
        assert_eq!(config.upload_mode, UploadMode::Inline);
    }

    #[test]
    fn test_env_overlay() {
        let overlay = ConfigOverlay::from_env_with(|key| match key {
            "RESUME_API_URL" => Some("http://api:8080".to_string()),
            "RESUME_UPLOAD_MODE" => Some("Navigate".to_string()),
            _ => None,
        })
        .unwrap();

        let mut config = ClientConfig::default();
        overlay.apply(&mut config);
        assert_eq!(config.api_base_url, "http://api:8080");
        assert_eq!(config.upload_mode, UploadMode::Reference);
        assert_eq!(config.date_locale, DEFAULT_DATE_LOCALE);
    }

    #[test]
    fn test_invalid_upload_mode_is_rejected() {
        let result = ConfigOverlay::from_env_with(|key| {
            (key == "RESUME_UPLOAD_MODE").then(|| "sideways".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_locale_parsing() {
        assert_eq!(parse_locale("en_US"), Some(Locale::en_US));
        assert_eq!(parse_locale("ru-RU"), Some(Locale::ru_RU));
        assert_eq!(parse_locale("xx_YY"), None);

        let config = ClientConfig {
            date_locale: "nonsense".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(config.locale(), Locale::POSIX);
    }
}
