use crate::error::Error;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Admin token shipped as the default. Running with it logs a warning on every admin check.
pub const PLACEHOLDER_ADMIN_TOKEN: &str = "changeme";

/// Environment variable naming an optional JSON/TOML config file
pub const CONFIG_PATH_ENV: &str = "PIXEL_TRACKER_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// API server address
    #[serde(default = "default_address")]
    pub address: String,
    /// API server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite database file, created on first start
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Connection pool max size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("events.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityConfig {
    /// Shared secret expected in the `token` query parameter of admin routes
    #[serde(default = "default_admin_token")]
    pub admin_token: String,
}

fn default_admin_token() -> String {
    PLACEHOLDER_ADMIN_TOKEN.to_string()
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            admin_token: default_admin_token(),
        }
    }
}

impl Config {
    /// Layer environment variables over the current values.
    ///
    /// `lookup` is usually `std::env::var(..).ok()`; tests pass a closure over a map.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("ADMIN_TOKEN") {
            self.security.admin_token = token;
        }

        if let Some(port) = lookup("PORT") {
            self.api.port = port
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("Invalid PORT {:?}: {}", port, e)))?;
        }

        if let Some(path) = lookup("PIXEL_TRACKER_DB") {
            self.database.path = PathBuf::from(path);
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            self.api.log_level = level;
        }

        Ok(())
    }

    /// Load the optional config file named by `PIXEL_TRACKER_CONFIG`, then apply the
    /// process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] over an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup(CONFIG_PATH_ENV).map(PathBuf::from);
        let mut config = load_config(path.as_deref())?;
        config.apply_env_overrides(lookup)?;
        Ok(config)
    }
}

/// Load configuration from a file or use default
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => {
            let config_str = std::fs::read_to_string(path)
                .context(format!("Failed to read config file: {:?}", path))?;

            let config = if path.extension().map_or(false, |ext| ext == "json") {
                serde_json::from_str(&config_str).context("Failed to parse JSON config")?
            } else if path.extension().map_or(false, |ext| ext == "toml") {
                toml::from_str(&config_str).context("Failed to parse TOML config")?
            } else {
                return Err(Error::Config(format!("Unsupported config file format: {:?}", path)).into());
            };

            Ok(config)
        }
        None => Ok(Config::default()),
    }
}
