//! Configuration management for the symws bridge

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Connection settings for Symphony Web Services
#[derive(Debug, Deserialize, Clone)]
pub struct SymwsConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub https: bool,
    pub client_id: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl SymwsConfig {
    /// Root of the symws web application, always ending with a slash
    pub fn base_url(&self) -> String {
        let scheme = if self.https { "https" } else { "http" };
        format!("{}://{}:{}/symws/", scheme, self.host, self.port)
    }
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Display behaviors for holdings and patron screens
#[derive(Debug, Deserialize, Clone)]
pub struct BehaviorsConfig {
    #[serde(default)]
    pub show_base_call_number: bool,
    #[serde(default)]
    pub show_staff_notes: bool,
    /// Unset means the login options are shown
    #[serde(default)]
    pub show_account_login: Option<bool>,
    #[serde(default = "default_fee_type")]
    pub show_fee_type: String,
}

fn default_fee_type() -> String {
    "ALL_FEES".to_string()
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    Memory,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    pub ttl_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub symws: SymwsConfig,
    #[serde(default)]
    pub behaviors: BehaviorsConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub redis: RedisConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables with prefix SYMWS_ (e.g. SYMWS_SYMWS__HOST)
            .add_source(
                Environment::with_prefix("SYMWS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("symws.client_id", env::var("SYMWS_CLIENT_ID").ok())?
            .set_override_option("redis.url", env::var("REDIS_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for SymwsConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            https: false,
            client_id: "DS_CLIENT".to_string(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for BehaviorsConfig {
    fn default() -> Self {
        Self {
            show_base_call_number: false,
            show_staff_notes: false,
            show_account_login: None,
            show_fee_type: default_fee_type(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::Memory,
            ttl_seconds: 3600,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_scheme() {
        let mut symws = SymwsConfig {
            host: "ils.example.edu".to_string(),
            port: 8080,
            ..SymwsConfig::default()
        };
        assert_eq!(symws.base_url(), "http://ils.example.edu:8080/symws/");

        symws.https = true;
        assert_eq!(symws.base_url(), "https://ils.example.edu:8080/symws/");
    }
}
