//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use mindful_core::Locale;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where accounts, moods, profiles and feedback live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// Process memory; everything is gone on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("'{}' is not one of postgres, memory", other)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub storage: StorageBackend,
    /// Required for the Postgres backend only.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub cors_origin: String,
    pub auth_max_attempts: NonZeroU32,
    pub auth_window: Duration,
    pub chat_reply_delay: Duration,
    pub session_ttl_days: i64,
    pub default_locale: Locale,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            storage: StorageBackend::Postgres,
            database_url: None,
            log_level: Level::INFO,
            cors_origin: "http://localhost:5173".to_string(),
            auth_max_attempts: NonZeroU32::MIN.saturating_add(4),
            auth_window: Duration::from_secs(900),
            chat_reply_delay: Duration::from_millis(1500),
            session_ttl_days: 30,
            default_locale: Locale::Th,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source; unset variables keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        // --- Server and Storage ---
        let bind_address = parsed(&lookup, "BIND_ADDRESS")?.unwrap_or(defaults.bind_address);
        let storage = parsed(&lookup, "STORAGE_BACKEND")?.unwrap_or(defaults.storage);
        let database_url = lookup("DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingVar("DATABASE_URL".to_string()));
        }

        let log_level = match lookup("RUST_LOG") {
            Some(raw) => raw.parse::<Level>().map_err(|_| {
                ConfigError::InvalidValue(
                    "RUST_LOG".to_string(),
                    format!("'{}' is not a valid log level", raw),
                )
            })?,
            None => defaults.log_level,
        };
        let cors_origin = lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin);

        // --- Auth ---
        let auth_max_attempts =
            parsed(&lookup, "AUTH_MAX_ATTEMPTS")?.unwrap_or(defaults.auth_max_attempts);
        let auth_window = parsed::<u64, _>(&lookup, "AUTH_WINDOW_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.auth_window);
        let session_ttl_days =
            parsed(&lookup, "SESSION_TTL_DAYS")?.unwrap_or(defaults.session_ttl_days);
        if session_ttl_days <= 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_DAYS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        // --- Chat and Language ---
        let chat_reply_delay = parsed::<u64, _>(&lookup, "CHAT_REPLY_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.chat_reply_delay);
        let default_locale =
            parsed(&lookup, "DEFAULT_LOCALE")?.unwrap_or(defaults.default_locale);

        Ok(Self {
            bind_address,
            storage,
            database_url,
            log_level,
            cors_origin,
            auth_max_attempts,
            auth_window,
            chat_reply_delay,
            session_ttl_days,
            default_locale,
        })
    }
}

fn parsed<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let config = Config::from_lookup(lookup(&[("STORAGE_BACKEND", "memory")])).unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.auth_max_attempts.get(), 5);
        assert_eq!(config.auth_window, Duration::from_secs(900));
        assert_eq!(config.chat_reply_delay, Duration::from_millis(1500));
        assert_eq!(config.default_locale, Locale::Th);
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(var) if var == "DATABASE_URL"));
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = Config::from_lookup(lookup(&[
            ("STORAGE_BACKEND", "memory"),
            ("AUTH_MAX_ATTEMPTS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "AUTH_MAX_ATTEMPTS"));

        let err = Config::from_lookup(lookup(&[
            ("STORAGE_BACKEND", "memory"),
            ("DEFAULT_LOCALE", "fr"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "DEFAULT_LOCALE"));
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/mindful"),
            ("BIND_ADDRESS", "127.0.0.1:8080"),
            ("CHAT_REPLY_DELAY_MS", "0"),
            ("DEFAULT_LOCALE", "en"),
            ("RUST_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.chat_reply_delay, Duration::ZERO);
        assert_eq!(config.default_locale, Locale::En);
        assert_eq!(config.log_level, Level::DEBUG);
    }
}
