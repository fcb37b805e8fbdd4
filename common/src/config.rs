//! Service configuration loaded from the environment.

use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Default shared database; `mode=rwc` creates the file on first start.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://hotels.db?mode=rwc";

/// Sessions issued by the identity platform are honoured for this long by default.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

/// Per-service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub service_name: String,
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub session_ttl_hours: i64,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Loads configuration for the named service.
    ///
    /// `default_port` is used when `SERVER_PORT` is unset or invalid.
    pub fn load_with_service(service_name: &str, default_port: u16) -> Self {
        Self {
            service_name: service_name.to_string(),
            host: var_or("HOST", "0.0.0.0".to_string()),
            port: var_or("SERVER_PORT", default_port),
            database_url: var_or("DATABASE_URL", DEFAULT_DATABASE_URL.to_string()),
            session_ttl_hours: var_or("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS),
            log_format: var_or("LOG_FORMAT", LogFormat::Pretty),
        }
    }

    /// `host:port` string to bind the listener to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Base URLs of the other services, used for service-to-service calls.
#[derive(Debug, Clone)]
pub struct ServiceUrls {
    pub catalog_service: String,
    pub booking_service: String,
}

impl ServiceUrls {
    pub fn load() -> Self {
        Self {
            catalog_service: var_or(
                "CATALOG_SERVICE_URL",
                "http://127.0.0.1:8081".to_string(),
            ),
            booking_service: var_or(
                "BOOKING_SERVICE_URL",
                "http://127.0.0.1:8082".to_string(),
            ),
        }
    }
}

/// Reads `key` and parses it, falling back to `default` when the variable
/// is missing or does not parse.
fn var_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => parse_or(key, &raw, default),
        Err(_) => {
            info!("{key} not set, using default: {default:?}");
            default
        }
    }
}

fn parse_or<T>(key: &str, raw: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value `{raw}`: {e}, using default: {default:?}");
        default
    })
}

/// Loads `.env` from the working directory (best-effort, no error if missing).
///
/// Variables already present in the environment win over the file.
pub fn load_dotenv() {
    let Ok(content) = std::fs::read_to_string(".env") else {
        return;
    };

    for (key, value) in parse_dotenv(&content) {
        if env::var(key).is_err() {
            env::set_var(key, value);
        }
    }
}

fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim().trim_matches('"')))
        .collect()
}
