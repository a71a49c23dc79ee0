//! Configuration sections shared by d21s components.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Log output stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
}

/// Common logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,

    /// Log output stream: "stdout" or "stderr".
    #[serde(default)]
    pub output: LogOutput,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            output: LogOutput::default(),
        }
    }
}

/// Connection settings for the d21s REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Service account key id (basic auth username).
    #[serde(default)]
    pub key_id: Option<String>,

    /// Service account secret (basic auth password).
    #[serde(default)]
    pub key_secret: Option<SecretString>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.disruptive-technologies.com/v2".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            key_id: None,
            key_secret: None,
            timeout_secs: default_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(default)]
        api: ApiConfig,
        #[serde(default)]
        logging: LoggingConfig,
    }

    #[test]
    fn test_default_config() {
        let config: Wrapper = serde_json::from_str("{}").unwrap();

        assert_eq!(
            config.api.base_url,
            "https://api.disruptive-technologies.com/v2"
        );
        assert!(config.api.key_id.is_none());
        assert!(config.api.key_secret.is_none());
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert_eq!(config.logging.output, LogOutput::Stdout);
    }

    #[test]
    fn test_parse_api_credentials() {
        let json = r#"
        {
            "api": {
                "base_url": "http://localhost:8080/v2",
                "key_id": "c0md3pm0p7bet3vico8g",
                "key_secret": "s3cr3t",
                "timeout_secs": 5
            }
        }
        "#;

        let config: Wrapper = serde_json::from_str(json).unwrap();

        assert_eq!(config.api.base_url, "http://localhost:8080/v2");
        assert_eq!(config.api.key_id.as_deref(), Some("c0md3pm0p7bet3vico8g"));
        assert_eq!(
            config.api.key_secret.as_ref().map(|s| s.expose_secret().as_str()),
            Some("s3cr3t")
        );
        assert_eq!(config.api.timeout_secs, 5);
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let config: Wrapper =
            serde_json::from_str(r#"{ "api": { "key_secret": "s3cr3t" } }"#).unwrap();

        assert!(!format!("{:?}", config.api).contains("s3cr3t"));
    }

    #[test]
    fn test_json_logging_to_stderr() {
        let json = r#"
        {
            "logging": {
                "level": "debug",
                "format": "json",
                "output": "stderr"
            }
        }
        "#;

        let config: Wrapper = serde_json::from_str(json).unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.output, LogOutput::Stderr);
    }
}
