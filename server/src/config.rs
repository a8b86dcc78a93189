//! Server configuration from environment variables.

use std::env;
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_POOL_SIZE: u32 = 10;
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 30;
pub const MAX_SESSION_TTL_DAYS: i64 = 3650;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: String, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub pool_size: u32,
    /// Lifetime of a login token.
    pub session_ttl_days: i64,
    /// Adds an `X-DB-Query-Count` header to every response.
    pub track_query_count: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`: PostgreSQL connection string
    ///
    /// Optional:
    /// - `BIND_ADDR`: listen address (default: "0.0.0.0:3000")
    /// - `DATABASE_POOL_SIZE`: max pooled connections (default: 10)
    /// - `SESSION_TTL_DAYS`: token lifetime, 1 to 3650 (default: 30)
    /// - `TRACK_DB_QUERY_COUNT`: "1" to report per-request query counts
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        let bind_addr = parse_or(&lookup, "BIND_ADDR", || SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))?;
        let pool_size = parse_or(&lookup, "DATABASE_POOL_SIZE", || DEFAULT_POOL_SIZE)?;
        if pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "DATABASE_POOL_SIZE".to_string(),
                value: "0".to_string(),
            });
        }
        let session_ttl_days =
            parse_or(&lookup, "SESSION_TTL_DAYS", || DEFAULT_SESSION_TTL_DAYS)?;
        if !(1..=MAX_SESSION_TTL_DAYS).contains(&session_ttl_days) {
            return Err(ConfigError::InvalidValue {
                name: "SESSION_TTL_DAYS".to_string(),
                value: session_ttl_days.to_string(),
            });
        }

        let track_query_count = lookup("TRACK_DB_QUERY_COUNT")
            .map(|v| v == "1")
            .unwrap_or(false);

        Ok(Self {
            database_url,
            bind_addr,
            pool_size,
            session_ttl_days,
            track_query_count,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: impl FnOnce() -> T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value,
        }),
        None => Ok(default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("DATABASE_URL", "postgres://localhost/foodgram")]).unwrap();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.session_ttl_days, DEFAULT_SESSION_TTL_DAYS);
        assert!(!config.track_query_count);
    }

    #[test]
    fn test_database_url_required() {
        assert_eq!(
            config(&[]).unwrap_err(),
            ConfigError::MissingEnvVar("DATABASE_URL".to_string())
        );
    }

    #[test]
    fn test_invalid_values() {
        let err = config(&[
            ("DATABASE_URL", "postgres://localhost/foodgram"),
            ("DATABASE_POOL_SIZE", "many"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name, .. } if name == "DATABASE_POOL_SIZE"));

        let err = config(&[
            ("DATABASE_URL", "postgres://localhost/foodgram"),
            ("BIND_ADDR", "nowhere"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name, .. } if name == "BIND_ADDR"));
    }

    #[test]
    fn test_session_ttl_range() {
        for value in ["0", "-3", "3651", "9223372036854775807"] {
            let err = config(&[
                ("DATABASE_URL", "postgres://localhost/foodgram"),
                ("SESSION_TTL_DAYS", value),
            ])
            .unwrap_err();
            assert_eq!(
                err,
                ConfigError::InvalidValue {
                    name: "SESSION_TTL_DAYS".to_string(),
                    value: value.to_string(),
                }
            );
        }

        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/foodgram"),
            ("SESSION_TTL_DAYS", "3650"),
        ])
        .unwrap();
        assert_eq!(config.session_ttl_days, MAX_SESSION_TTL_DAYS);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("DATABASE_URL", "postgres://db/foodgram"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("SESSION_TTL_DAYS", "7"),
            ("TRACK_DB_QUERY_COUNT", "1"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.session_ttl_days, 7);
        assert!(config.track_query_count);
    }
}
