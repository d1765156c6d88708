//! Configuration loading
//!
//! # Settings Sources Priority
//!
//! 1. Command-line `--config <path>`
//! 2. `ROSTER_CONFIG` environment variable
//! 3. User config file (`~/.config/roster/config.toml` on Linux)
//! 4. Built-in defaults
//!
//! After the file is read, individual environment variables override single
//! keys (`PORT`, `CORS_ORIGIN`, `ROSTER_UPSTREAM_URL`, `ROSTER_API_BASE_URL`).
//! A missing file is never fatal; a malformed one is.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ROSTER_CONFIG";

/// Default upstream member API
pub const DEFAULT_UPSTREAM_URL: &str = "https://chingu-members-api-12086067540.us-central1.run.app";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Forwarding server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port (default 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed browser origin; any origin when unset
    #[serde(default)]
    pub cors_origin: Option<String>,

    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Directory client settings
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the forwarding server
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Members revealed per "load more"
    #[serde(default = "default_reveal_step")]
    pub reveal_step: usize,

    /// Hard cap on members pulled for the map view
    #[serde(default = "default_map_member_cap")]
    pub map_member_cap: usize,

    /// Consecutive pages fetched before pausing
    #[serde(default = "default_batch_burst")]
    pub batch_burst: usize,

    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    #[serde(default)]
    pub country_match: CountryField,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Which member field the country filter compares against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountryField {
    #[default]
    Code,
    Name,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_upstream_url() -> String {
    DEFAULT_UPSTREAM_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_page_size() -> u64 {
    100
}

fn default_reveal_step() -> usize {
    20
}

fn default_map_member_cap() -> usize {
    1000
}

fn default_batch_burst() -> usize {
    5
}

fn default_throttle_ms() -> u64 {
    50
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: None,
            upstream_url: default_upstream_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            reveal_step: default_reveal_step(),
            map_member_cap: default_map_member_cap(),
            batch_burst: default_batch_burst(),
            throttle_ms: default_throttle_ms(),
            country_match: CountryField::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ProxyConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ClientConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TomlConfig {
    /// Parse configuration text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read one file; missing file is `Error::Io`
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolve, load and apply environment overrides
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let mut config = match resolve_config_path(cli_path) {
            Some(path) => match Self::from_file(&path) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(Error::Io(e)) => {
                    warn!(
                        "Config file {} unreadable ({}), using defaults",
                        path.display(),
                        e
                    );
                    Self::default()
                }
                Err(e) => return Err(e),
            },
            None => {
                info!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Single-key overrides from the environment
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            match port.trim().parse() {
                Ok(port) => self.proxy.port = port,
                Err(e) => warn!("Invalid PORT value '{}': {}", port, e),
            }
        }
        if let Ok(origin) = std::env::var("CORS_ORIGIN") {
            if !origin.trim().is_empty() {
                self.proxy.cors_origin = Some(origin);
            }
        }
        if let Ok(url) = std::env::var("ROSTER_UPSTREAM_URL") {
            self.proxy.upstream_url = url;
        }
        if let Ok(url) = std::env::var("ROSTER_API_BASE_URL") {
            self.client.api_base_url = url;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.client.page_size == 0 {
            return Err(Error::Config("client.page_size must be positive".to_string()));
        }
        if self.client.reveal_step == 0 {
            return Err(Error::Config("client.reveal_step must be positive".to_string()));
        }
        if self.client.batch_burst == 0 {
            return Err(Error::Config("client.batch_burst must be positive".to_string()));
        }
        Ok(())
    }
}

/// Pick the config file to read, if any
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path().filter(|p| p.exists())
}

/// Platform user config location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("roster").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.proxy.port, 3000);
        assert_eq!(config.client.page_size, 100);
        assert_eq!(config.client.reveal_step, 20);
        assert_eq!(config.client.map_member_cap, 1000);
        assert_eq!(config.client.country_match, CountryField::Code);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_sections() {
        let config = TomlConfig::from_toml_str(
            r#"
            [client]
            page_size = 50
            country_match = "name"

            [proxy]
            cors_origin = "http://localhost:5173"
            "#,
        )
        .unwrap();
        assert_eq!(config.client.page_size, 50);
        assert_eq!(config.client.country_match, CountryField::Name);
        assert_eq!(config.client.reveal_step, 20);
        assert_eq!(config.proxy.cors_origin.as_deref(), Some("http://localhost:5173"));
        assert_eq!(config.proxy.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        assert!(matches!(
            TomlConfig::from_toml_str("[client\npage_size = "),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(matches!(
            TomlConfig::from_toml_str("[client]\npage_size = 0"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_cli_path_wins() {
        let path = PathBuf::from("/tmp/some/roster.toml");
        assert_eq!(resolve_config_path(Some(&path)), Some(path));
    }
}
