//! # Database Configuration

use shop_core::ShopError;
use std::env;

/// MySQL connection settings and the table served by `/api/data`
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub table: String,
    pub max_connections: u32,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ShopError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ShopError::Configuration(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

impl DatabaseConfig {
    /// Load from `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`,
    /// `DB_TABLE` and `DB_MAX_CONNECTIONS`. Every value has a local default.
    pub fn from_env() -> Result<Self, ShopError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Ok(Self {
            host: env_or("DB_HOST", &defaults.host),
            port: parse_env("DB_PORT", defaults.port)?,
            user: env_or("DB_USER", &defaults.user),
            password: env_or("DB_PASSWORD", &defaults.password),
            database: env_or("DB_NAME", &defaults.database),
            table: env_or("DB_TABLE", &defaults.table),
            max_connections: parse_env("DB_MAX_CONNECTIONS", defaults.max_connections)?,
        })
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "yoshinaga".to_string(),
            table: "yoshinaga".to_string(),
            max_connections: 5,
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("table", &self.table)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}
