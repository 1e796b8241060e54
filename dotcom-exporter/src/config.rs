//! Configuration for the Dotcom-Monitor exporter.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Complete exporter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// HTTP endpoint settings.
    #[serde(default)]
    pub web: WebConfig,

    /// Upstream Dotcom-Monitor settings.
    #[serde(default)]
    pub dotcom: DotcomConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Address to listen on (default: "0.0.0.0:9423").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Path for metrics endpoint (default: "/metrics").
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_listen() -> String {
    "0.0.0.0:9423".to_string()
}

fn default_path() -> String {
    "/metrics".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            path: default_path(),
        }
    }
}

/// Dotcom-Monitor XML API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DotcomConfig {
    /// Account Global Unique Identifier
    /// (Configure > Integrations > Unique Identifier column).
    #[serde(default)]
    pub pid: String,

    /// Site ("Device") IDs or names to report on. Wildcards such as `*`
    /// or `123*` are passed through to the API unchanged.
    #[serde(default = "default_sites")]
    pub sites: Vec<String>,

    /// Timeout for the whole request/response cycle, e.g. "10s".
    #[serde(default = "default_http_timeout", with = "humantime_duration")]
    pub http_timeout: Duration,

    /// Scheme and host of the XML reporting API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_sites() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_base_url() -> String {
    "https://xmlreporter.dotcom-monitor.com".to_string()
}

impl Default for DotcomConfig {
    fn default() -> Self {
        Self {
            pid: String::new(),
            sites: default_sites(),
            http_timeout: default_http_timeout(),
            base_url: default_base_url(),
        }
    }
}

impl DotcomConfig {
    /// PID shortened for logging.
    pub fn redacted_pid(&self) -> String {
        let head: String = self.pid.chars().take(10).collect();
        format!("{}...", head)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Split a comma-separated site list, trimming entries and dropping blanks.
pub fn parse_sites(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a human-readable duration such as "10s" or "1m 30s".
pub fn parse_duration(s: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(s)
}

impl ExporterConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    ///
    /// Not validated: CLI overrides may still complete it.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(json5::from_str(content)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dotcom.pid.trim().is_empty() {
            return Err(ConfigError::validation("dotcom pid must not be empty"));
        }

        if self.dotcom.sites.is_empty() {
            return Err(ConfigError::validation(
                "at least one dotcom site must be configured",
            ));
        }

        if self.dotcom.http_timeout.is_zero() {
            return Err(ConfigError::validation("dotcom http_timeout must be > 0"));
        }

        if !(self.dotcom.base_url.starts_with("http://")
            || self.dotcom.base_url.starts_with("https://"))
        {
            return Err(ConfigError::Validation(format!(
                "Invalid dotcom base_url: {}",
                self.dotcom.base_url
            )));
        }

        // Validate listen address format
        if self.web.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "Invalid listen address: {}",
                self.web.listen
            )));
        }

        if !self.web.path.starts_with('/') {
            return Err(ConfigError::validation("Metrics path must start with /"));
        }

        if self.web.path == "/" {
            return Err(ConfigError::validation(
                "Metrics path must not be / (reserved for the landing page)",
            ));
        }

        Ok(())
    }
}

/// Serde adapter storing a [`Duration`] as a humantime string.
mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
