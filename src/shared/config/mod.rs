//! Server configuration module
//!
//! Provides the configuration types for the server. Values come from a TOML
//! file, from environment variables, or from the builder. The backend layers
//! the environment on top of whatever was loaded first.

use serde::Deserialize;
use thiserror::Error;

/// Secret used when `JWT_SECRET` is unset. Only fit for local development.
pub const DEV_JWT_SECRET: &str = "roomcast-dev-secret-change-me";

/// bcrypt's default work factor
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Server configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// SQLite connection URL (`sqlite://path.db` or `sqlite::memory:`)
    pub database_url: String,
    /// HS256 secret for bearer tokens
    pub jwt_secret: String,
    /// Listen port
    pub port: u16,
    /// Lifetime of issued tokens and their session rows
    pub token_ttl_days: i64,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
    /// Channels idle longer than this are deleted by maintenance
    pub inactive_channel_days: i64,
    /// Directory served as static files, if any
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://roomcast.db".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            port: 3000,
            token_ttl_days: 7,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            inactive_channel_days: 30,
            static_dir: Some("public".to_string()),
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfigBuilder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingValue("database_url"));
        }
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("jwt_secret"));
        }
        if self.token_ttl_days <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "token_ttl_days",
                value: self.token_ttl_days.to_string(),
            });
        }
        if self.inactive_channel_days <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "inactive_channel_days",
                value: self.inactive_channel_days.to_string(),
            });
        }
        // bcrypt accepts 4..=31
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "bcrypt_cost",
                value: self.bcrypt_cost.to_string(),
            });
        }
        Ok(())
    }

    /// Whether the development secret is still in use
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    database_url: Option<String>,
    jwt_secret: Option<String>,
    port: Option<u16>,
    token_ttl_days: Option<i64>,
    bcrypt_cost: Option<u32>,
    inactive_channel_days: Option<i64>,
    static_dir: Option<Option<String>>,
}

impl ServerConfigBuilder {
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn token_ttl_days(mut self, days: i64) -> Self {
        self.token_ttl_days = Some(days);
        self
    }

    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = Some(cost);
        self
    }

    pub fn inactive_channel_days(mut self, days: i64) -> Self {
        self.inactive_channel_days = Some(days);
        self
    }

    /// Serve static files from `dir`, or nothing with `None`
    pub fn static_dir(mut self, dir: Option<String>) -> Self {
        self.static_dir = Some(dir);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let defaults = ServerConfig::default();
        let config = ServerConfig {
            database_url: self.database_url.unwrap_or(defaults.database_url),
            jwt_secret: self.jwt_secret.unwrap_or(defaults.jwt_secret),
            port: self.port.unwrap_or(defaults.port),
            token_ttl_days: self.token_ttl_days.unwrap_or(defaults.token_ttl_days),
            bcrypt_cost: self.bcrypt_cost.unwrap_or(defaults.bcrypt_cost),
            inactive_channel_days: self
                .inactive_channel_days
                .unwrap_or(defaults.inactive_channel_days),
            static_dir: self.static_dir.unwrap_or(defaults.static_dir),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to read config file: {0}")]
    Io(String),
    #[error("failed to parse config: {0}")]
    Parse(String),
}
