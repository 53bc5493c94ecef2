// src/config.rs

use std::{env, net::SocketAddr};

use dotenvy::dotenv;

/// Maximum number of rows a leaderboard returns when the caller gives no limit.
pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 50;

/// Ended sessions considered by per-student analytics.
pub const STUDENT_RECENT_SESSIONS: i64 = 20;

/// Sessions echoed back in class analytics.
pub const CLASS_RECENT_SESSIONS: usize = 10;

/// One XP point per this many score points.
pub const SCORE_PER_XP: f64 = 10.0;

pub const XP_PER_LEVEL: u64 = 1000;

pub const READING_WORDS_PER_MINUTE: u32 = 200;

/// Default AQA reading time limits in minutes.
pub const FOUNDATION_TIME_LIMIT_MINUTES: u32 = 45;
pub const HIGHER_TIME_LIMIT_MINUTES: u32 = 60;

/// Days until an AQA assignment is due when the caller gives no date.
pub const DEFAULT_DUE_IN_DAYS: i64 = 7;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_key: String,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub log_dir: String,
}

impl Config {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let database_url = required("DATABASE_URL")?;
        url::Url::parse(&database_url).map_err(|e| ConfigError::Invalid {
            name: "DATABASE_URL",
            reason: e.to_string(),
        })?;

        let database_key = required("DATABASE_KEY")?;

        let rust_log = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: format!("`{}` is not a socket address", raw),
            })?,
            None => SocketAddr::from(([0, 0, 0, 0], 3000)),
        };

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                reason: format!("`{}` is not a positive integer", raw),
            })?,
            None => 5,
        };

        let log_dir = lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string());

        Ok(Self {
            database_url,
            database_key,
            rust_log,
            bind_addr,
            max_connections,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a HashMap<&str, &str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| vars.get(name).map(|v| v.to_string())
    }

    #[test]
    fn missing_store_location_is_fatal() {
        let vars = HashMap::from([("DATABASE_KEY", "secret")]);
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn missing_credential_is_fatal() {
        let vars = HashMap::from([("DATABASE_URL", "postgres://db.local/gems")]);
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_KEY"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let vars = HashMap::from([("DATABASE_URL", "postgres://db.local/gems"), ("DATABASE_KEY", "  ")]);
        assert_eq!(
            Config::from_lookup(lookup(&vars)).unwrap_err(),
            ConfigError::Missing("DATABASE_KEY")
        );
    }

    #[test]
    fn rejects_unparseable_url() {
        let vars = HashMap::from([("DATABASE_URL", "not a url"), ("DATABASE_KEY", "secret")]);
        assert!(matches!(
            Config::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid { name: "DATABASE_URL", .. })
        ));
    }

    #[test]
    fn applies_defaults() {
        let vars = HashMap::from([("DATABASE_URL", "postgres://db.local/gems"), ("DATABASE_KEY", "secret")]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.log_dir, "logs");
    }
}
