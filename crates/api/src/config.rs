//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use health::CheckOptions;

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// PostgreSQL connection settings.
///
/// Reads `DATABASE_URL`, or builds one from `DATABASE_HOST`, `DATABASE_PORT`,
/// `DATABASE_NAME`, `DATABASE_USER` and `DATABASE_PASSWORD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl DatabaseConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env_opt("DATABASE_URL"),
            host: env_or("DATABASE_HOST", defaults.host),
            port: env_parse("DATABASE_PORT", defaults.port),
            name: env_or("DATABASE_NAME", defaults.name),
            user: env_or("DATABASE_USER", defaults.user),
            password: env_or("DATABASE_PASSWORD", defaults.password),
        }
    }

    /// Returns the connection URL, preferring an explicit `DATABASE_URL`.
    pub fn url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        if self.password.is_empty() {
            format!(
                "postgres://{}@{}:{}/{}",
                self.user, self.host, self.port, self.name
            )
        } else {
            format!(
                "postgres://{}:{}@{}:{}/{}",
                self.user, self.password, self.host, self.port, self.name
            )
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            name: "kairoflow".to_string(),
            user: "kairoflow".to_string(),
            password: String::new(),
        }
    }
}

/// Redis connection settings from `REDIS_HOST`, `REDIS_PORT` and
/// `REDIS_PASSWORD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: String,
}

impl RedisConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_or("REDIS_HOST", defaults.host),
            port: env_parse("REDIS_PORT", defaults.port),
            password: env_or("REDIS_PASSWORD", defaults.password),
        }
    }

    pub fn url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}:{}/", self.host, self.port)
        } else {
            format!("redis://:{}@{}:{}/", self.password, self.host, self.port)
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "redis".to_string(),
            port: 6379,
            password: String::new(),
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT` — `text` or `json` (default: `text`)
/// - `HEALTH_DATABASE_TIMEOUT_MS`, `HEALTH_CACHE_TIMEOUT_MS`,
///   `HEALTH_DISK_TIMEOUT_MS` — probe timeouts (default: `2000`)
/// - `HEALTH_DISK_PATH` — filesystem to inspect (default: `"/"`)
/// - `HEALTH_DISK_WARNING_PERCENT`, `HEALTH_DISK_CRITICAL_PERCENT` — disk
///   thresholds (default: `80`, `90`); a warning threshold above the
///   critical one is clamped when the aggregator is built
///
/// Malformed numbers fall back to their defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub checks: CheckOptions,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = CheckOptions::default();
        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_parse("PORT", 3000),
            log_level: env_or("RUST_LOG", "info".to_string()),
            log_format: env_parse("LOG_FORMAT", LogFormat::default()),
            database: DatabaseConfig::from_env(),
            redis: RedisConfig::from_env(),
            checks: CheckOptions {
                database_timeout: env_millis("HEALTH_DATABASE_TIMEOUT_MS", defaults.database_timeout),
                cache_timeout: env_millis("HEALTH_CACHE_TIMEOUT_MS", defaults.cache_timeout),
                disk_timeout: env_millis("HEALTH_DISK_TIMEOUT_MS", defaults.disk_timeout),
                disk_path: env_opt("HEALTH_DISK_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.disk_path),
                disk_warning_percent: env_parse(
                    "HEALTH_DISK_WARNING_PERCENT",
                    defaults.disk_warning_percent,
                ),
                disk_critical_percent: env_parse(
                    "HEALTH_DISK_CRITICAL_PERCENT",
                    defaults.disk_critical_percent,
                ),
            },
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database: DatabaseConfig::default(),
            redis: RedisConfig::default(),
            checks: CheckOptions::default(),
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: String) -> String {
    env_opt(key).unwrap_or(default)
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env_opt(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_millis(key: &str, default: Duration) -> Duration {
    env_opt(key)
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}
