//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Ranking service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LadderConfig {
    /// Base URL of the data API (region paths are appended)
    #[serde(default = "default_ladder_base_url")]
    pub base_url: String,

    /// Base URL of the human-facing site, used for links
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Region selected on first run; later changes are persisted in settings
    #[serde(default = "default_region")]
    pub region: String,

    /// Timeout in seconds
    #[serde(default = "default_ladder_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_ladder_base_url() -> String {
    "https://www.notgarpr.com:3001/".to_string()
}

fn default_site_url() -> String {
    "https://www.notgarpr.com/#/".to_string()
}

fn default_region() -> String {
    "norcal".to_string()
}

fn default_ladder_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("ladder-bot/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            base_url: default_ladder_base_url(),
            site_url: default_site_url(),
            region: default_region(),
            timeout_seconds: default_ladder_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Reaction image service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionsConfig {
    #[serde(default = "default_reactions_base_url")]
    pub base_url: String,

    /// Environment variable holding the bearer token
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_reactions_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_reactions_base_url() -> String {
    "https://api.weeb.sh/".to_string()
}

fn default_api_key_env() -> String {
    "WEEB_SH_API_KEY".to_string()
}

fn default_reactions_timeout() -> u64 {
    10
}

impl Default for ReactionsConfig {
    fn default() -> Self {
        Self {
            base_url: default_reactions_base_url(),
            api_key_env: default_api_key_env(),
            timeout_seconds: default_reactions_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ReactionsConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub ladder: LadderConfig,

    #[serde(default)]
    pub reactions: ReactionsConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            ladder: LadderConfig::default(),
            reactions: ReactionsConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ladder.timeout_seconds == 0 || self.reactions.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Timeouts must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        for (name, value) in [
            ("ladder.base_url", &self.ladder.base_url),
            ("ladder.site_url", &self.ladder.site_url),
            ("reactions.base_url", &self.reactions.base_url),
        ] {
            Url::parse(value).map_err(|e| {
                ConfigError::ValidationError(format!("{} is not a valid URL: {}", name, e))
            })?;
        }

        validate_region(&self.ladder.region)
    }
}

/// A region is used verbatim as a URI path segment.
pub fn validate_region(region: &str) -> Result<(), ConfigError> {
    if region.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Region must not be empty".to_string(),
        ));
    }
    if region.contains(['/', '?', '#']) || region.chars().any(char::is_whitespace) {
        return Err(ConfigError::ValidationError(format!(
            "Region must be a single path segment: {:?}",
            region
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.ladder.region, "norcal");
        assert_eq!(config.ladder.timeout_seconds, 10);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_reactions_config_default() {
        let reactions = ReactionsConfig::default();

        assert_eq!(reactions.base_url, "https://api.weeb.sh/");
        assert_eq!(reactions.api_key_env, "WEEB_SH_API_KEY");
        assert_eq!(reactions.timeout_seconds, 10);
        assert!(reactions.user_agent.starts_with("ladder-bot/"));
    }

    #[test]
    fn test_reactions_settings_independent_of_ladder() {
        let config: AppConfig = toml::from_str(
            r#"
            [ladder]
            timeout_seconds = 30
            user_agent = "ranked-lookups/2"

            [reactions]
            user_agent = "reaction-images/1"
            "#,
        )
        .unwrap();

        assert_eq!(config.ladder.timeout_seconds, 30);
        assert_eq!(config.reactions.timeout_seconds, 10);
        assert_eq!(config.ladder.user_agent, "ranked-lookups/2");
        assert_eq!(config.reactions.user_agent, "reaction-images/1");
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.ladder.timeout_seconds = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = AppConfig::default();
        config.ladder.base_url = "not a url".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_region() {
        assert!(validate_region("cfl").is_ok());
        assert!(validate_region("").is_err());
        assert!(validate_region("nor cal").is_err());
        assert!(validate_region("a/b").is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            data_dir = "/tmp/ladder"

            [ladder]
            region = "cfl"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/ladder"));
        assert_eq!(config.ladder.region, "cfl");
        assert_eq!(config.ladder.base_url, "https://www.notgarpr.com:3001/");
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        // Should be parseable
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
        assert_eq!(config.ladder.region, parsed.ladder.region);
    }
}
