//! Application configuration loaded from environment variables.

use std::time::Duration;

use integrations::SmtpConfig;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`, `PORT`: bind address (default `0.0.0.0:3000`)
/// - `RUST_LOG`: tracing filter directive (default `"info"`)
/// - `LOG_FORMAT`: `text` or `json`
/// - `DATABASE_URL`: Postgres connection string; in-memory store when unset
/// - `WMS_BASE_URL`, `AUDIT_BASE_URL`: HTTP collaborators; fakes when unset
/// - `SMTP_HOST` and the other `SMTP_*` variables: SMTP delivery; fake when unset
/// - `HTTP_TIMEOUT_SECS`: timeout for outbound HTTP calls (default `10`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub wms_base_url: Option<String>,
    pub audit_base_url: Option<String>,
    pub smtp: Option<SmtpConfig>,
    pub http_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let smtp = get("SMTP_HOST").map(|host| {
            let fallback = SmtpConfig::default();
            SmtpConfig {
                host,
                port: get("SMTP_PORT")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(fallback.port),
                from_email: get("SMTP_FROM_EMAIL").unwrap_or(fallback.from_email),
                from_name: get("SMTP_FROM_NAME").unwrap_or(fallback.from_name),
                enable_tls: get("SMTP_ENABLE_TLS")
                    .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
                    .unwrap_or(fallback.enable_tls),
                username: get("SMTP_USERNAME"),
                password: get("SMTP_PASSWORD"),
            }
        });

        Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: get("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: get("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: get("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
            database_url: get("DATABASE_URL"),
            wms_base_url: get("WMS_BASE_URL"),
            audit_base_url: get("AUDIT_BASE_URL"),
            smtp,
            http_timeout: get("HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
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
            database_url: None,
            wms_base_url: None,
            audit_base_url: None,
            smtp: None,
            http_timeout: Duration::from_secs(10),
        }
    }
}
