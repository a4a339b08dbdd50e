use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::logging::LogConfig;
use crate::models::Goal;

/// Environment variable holding the diet-plan service base URL
pub const API_URL_ENV: &str = "NUTRIRS_API_URL";

/// Environment variable holding the remote call timeout in seconds
pub const TIMEOUT_ENV: &str = "NUTRIRS_TIMEOUT_SECS";

/// Base URL used when neither the environment nor the config file sets one
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Remote diet-plan service settings
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Local meal planner settings
    #[serde(default)]
    pub planner: PlannerSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Connection settings for the remote diet-plan service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL, e.g. `http://localhost:5000/api`
    pub base_url: String,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

/// Local meal planner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerSettings {
    /// Goal used when a command does not specify one
    pub default_goal: Goal,

    /// Food catalog file replacing the built-in table
    pub catalog_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            remote: RemoteConfig::default(),
            planner: PlannerSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for PlannerSettings {
    fn default() -> Self {
        PlannerSettings {
            default_goal: Goal::Maintain,
            catalog_path: None,
        }
    }
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        RemoteConfig {
            base_url: base_url.into(),
            timeout_secs: timeout.as_secs().max(1),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the URL parses and the timeout is usable
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid diet-plan service URL: {}", self.base_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Diet-plan service URL must use http or https: {}", self.base_url);
        }

        if self.timeout_secs == 0 {
            anyhow::bail!("Remote timeout must be greater than 0");
        }

        Ok(())
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        // Update modification timestamp
        self.metadata.updated_at = Utc::now();

        // Create directory if it doesn't exist
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".nutrirs")
            .join("config.toml")
    }

    /// Load the effective configuration
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used when present and built-in defaults otherwise. Environment
    /// overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_or_default(),
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        if !config_path.exists() {
            return Self::default();
        }

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %err,
                    "Unreadable config file, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Apply `NUTRIRS_API_URL` / `NUTRIRS_TIMEOUT_SECS` from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.remote.base_url = url.trim().to_string();
        }

        if let Some(timeout) = lookup(TIMEOUT_ENV) {
            self.remote.timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", TIMEOUT_ENV))?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.remote.validate()?;

        if let Some(path) = &self.planner.catalog_path {
            if path.as_os_str().is_empty() {
                anyhow::bail!("Catalog path cannot be empty");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.metadata.version, deserialized.metadata.version);
        assert_eq!(config.remote, deserialized.remote);
        assert_eq!(config.planner, deserialized.planner);
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original_config = AppConfig::default();
        original_config.remote.base_url = "https://diet.example.com/api".to_string();
        original_config.planner.default_goal = Goal::Lose;

        // Save and reload
        original_config.save_to_file(&config_path).unwrap();
        let loaded_config = AppConfig::load_from_file(&config_path).unwrap();

        assert_eq!(loaded_config.remote.base_url, "https://diet.example.com/api");
        assert_eq!(loaded_config.planner.default_goal, Goal::Lose);
    }

    #[test]
    fn test_partial_config_uses_section_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
[metadata]
version = "1.0"
created_at = "2024-01-01T00:00:00Z"
updated_at = "2024-01-01T00:00:00Z"

[remote]
base_url = "http://10.0.0.5:5000/api"
timeout_secs = 5
"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&config_path)).unwrap();
        assert_eq!(config.remote.timeout(), Duration::from_secs(5));
        assert_eq!(config.planner.default_goal, Goal::Maintain);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (API_URL_ENV, "https://plans.example.org/api"),
            (TIMEOUT_ENV, "12"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.remote.base_url, "https://plans.example.org/api");
        assert_eq!(config.remote.timeout_secs, 12);
    }

    #[test]
    fn test_bad_timeout_override_is_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|key| {
            (key == TIMEOUT_ENV).then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_remote_validation() {
        assert!(RemoteConfig::default().validate().is_ok());
        assert!(RemoteConfig::new("ftp://example.com", Duration::from_secs(5))
            .validate()
            .is_err());
        assert!(RemoteConfig::new("not a url", Duration::from_secs(5))
            .validate()
            .is_err());

        let mut config = RemoteConfig::default();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
