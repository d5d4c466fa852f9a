/**
 * Server Configuration
 *
 * This module loads the `ServerConfig` and opens the SQLite database.
 *
 * # Configuration Sources
 *
 * 1. Defaults from `ServerConfig::default()`
 * 2. A TOML file named by `ROOMCAST_CONFIG`, if set
 * 3. Environment variables (after `.env` is read by `main`)
 *
 * Later sources win. A missing `JWT_SECRET` is not fatal: the development
 * secret is used and a warning is logged.
 *
 * # Database
 *
 * `sqlite::memory:` (or `:memory:`) opens a private in-memory database with
 * a unique shared-cache name, so parallel tests never see each other's rows.
 * Any other URL is treated as a file database and created when missing.
 * Migrations are embedded and always run.
 */

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::shared::config::{ConfigError, ServerConfig};

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that stop the server from starting
#[derive(Debug, Error)]
pub enum InitError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load configuration from the optional TOML file and the environment
pub fn load_config() -> Result<ServerConfig, InitError> {
    let base = match std::env::var("ROOMCAST_CONFIG") {
        Ok(path) => {
            tracing::info!("[Config] Reading {}", path);
            let source = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::Io(format!("{}: {}", path, e)))?;
            ServerConfig::from_toml_str(&source)?
        }
        Err(_) => ServerConfig::default(),
    };

    let config = apply_env(base, |key| std::env::var(key).ok())?;

    if config.uses_dev_secret() {
        tracing::warn!("[Config] JWT_SECRET not set. Using the development secret.");
    }

    Ok(config)
}

/// Overlay environment values on `config`
///
/// `lookup` abstracts `std::env::var` so the overlay can be tested without
/// touching the process environment.
pub fn apply_env(
    mut config: ServerConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ServerConfig, ConfigError> {
    if let Some(url) = lookup("DATABASE_URL") {
        config.database_url = url;
    }
    if let Some(secret) = lookup("JWT_SECRET") {
        config.jwt_secret = secret;
    }
    if let Some(port) = lookup("SERVER_PORT") {
        config.port = parse_value("SERVER_PORT", &port)?;
    }
    if let Some(days) = lookup("TOKEN_TTL_DAYS") {
        config.token_ttl_days = parse_value("TOKEN_TTL_DAYS", &days)?;
    }
    if let Some(cost) = lookup("BCRYPT_COST") {
        config.bcrypt_cost = parse_value("BCRYPT_COST", &cost)?;
    }
    if let Some(days) = lookup("INACTIVE_CHANNEL_DAYS") {
        config.inactive_channel_days = parse_value("INACTIVE_CHANNEL_DAYS", &days)?;
    }
    if let Some(dir) = lookup("STATIC_DIR") {
        config.static_dir = if dir.is_empty() { None } else { Some(dir) };
    }
    config.validate()?;
    Ok(config)
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn is_memory_url(url: &str) -> bool {
    matches!(url, "sqlite::memory:" | ":memory:" | "sqlite://:memory:")
}

/// Open the database pool and run migrations
///
/// # Errors
///
/// Connection and migration failures are returned; the server cannot run
/// without its database.
pub async fn load_database(database_url: &str) -> Result<SqlitePool, InitError> {
    tracing::info!("[Database] Connecting to {}", database_url);

    let pool = if is_memory_url(database_url) {
        let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
        let memdb_uri = format!(
            "file:roomcast-memdb-{}-{}?mode=memory&cache=shared",
            std::process::id(),
            id
        );

        let options = SqliteConnectOptions::new()
            .filename(&memdb_uri)
            .shared_cache(true)
            .create_if_missing(true)
            .foreign_keys(true);

        // The database lives as long as one connection stays open.
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?
    };

    tracing::info!("[Database] Running migrations...");
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("[Database] Migrations applied");

    Ok(pool)
}
