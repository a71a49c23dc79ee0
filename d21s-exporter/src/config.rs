//! Configuration for the d21s exporter.

use d21s_common::config::{ApiConfig, LoggingConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::collector::LABEL_NAME;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete exporter configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExporterConfig {
    /// d21s API connection settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Prometheus exporter settings.
    #[serde(default)]
    pub prometheus: PrometheusConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Prometheus HTTP endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PrometheusConfig {
    /// Address to listen on (default: "0.0.0.0:9108").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Path for metrics endpoint (default: "/metrics").
    #[serde(default = "default_path")]
    pub path: String,

    /// Metric name namespace (default: "d21s").
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Constant labels added to all metrics.
    #[serde(default)]
    pub default_labels: HashMap<String, String>,
}

fn default_listen() -> String {
    "0.0.0.0:9108".to_string()
}

fn default_path() -> String {
    "/metrics".to_string()
}

fn default_namespace() -> String {
    "d21s".to_string()
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            path: default_path(),
            namespace: default_namespace(),
            default_labels: HashMap::new(),
        }
    }
}

impl ExporterConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// API URL and credentials are not checked here: a client that cannot be
    /// built leaves the exporter running with empty scrapes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate listen address format
        if self
            .prometheus
            .listen
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::Validation(format!(
                "Invalid listen address: {}",
                self.prometheus.listen
            )));
        }

        // Validate path starts with /
        if !self.prometheus.path.starts_with('/') {
            return Err(ConfigError::Validation(
                "Metrics path must start with /".to_string(),
            ));
        }

        // "/" serves the landing page
        if self.prometheus.path == "/" {
            return Err(ConfigError::Validation(
                "Metrics path must not be /".to_string(),
            ));
        }

        if !self.prometheus.namespace.is_empty()
            && !is_valid_metric_name(&self.prometheus.namespace)
        {
            return Err(ConfigError::Validation(format!(
                "Invalid metric namespace: {}",
                self.prometheus.namespace
            )));
        }

        for label in self.prometheus.default_labels.keys() {
            if !is_valid_label_name(label) || label == LABEL_NAME {
                return Err(ConfigError::Validation(format!(
                    "Invalid default label name: {}",
                    label
                )));
            }
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Check that a namespace matches `[a-zA-Z_:][a-zA-Z0-9_:]*`.
fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// Check that a label name matches `[a-zA-Z_][a-zA-Z0-9_]*` and is not reserved.
fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && !name.starts_with("__")
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use d21s_common::config::{LogFormat, LogOutput};
    use secrecy::ExposeSecret;
    use std::io::Write;

    #[test]
    fn test_parse_minimal_config() {
        let json = "{}";
        let config = ExporterConfig::parse(json).unwrap();

        assert_eq!(config.prometheus.listen, "0.0.0.0:9108");
        assert_eq!(config.prometheus.path, "/metrics");
        assert_eq!(config.prometheus.namespace, "d21s");
        assert!(config.prometheus.default_labels.is_empty());
        assert_eq!(
            config.api.base_url,
            "https://api.disruptive-technologies.com/v2"
        );
        assert!(config.api.key_id.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            api: {
                base_url: "https://api.example.com/v2",
                key_id: "c0md3pm0p7bet3vico8g",
                key_secret: "s3cr3t",
                timeout_secs: 10
            },
            prometheus: {
                listen: "127.0.0.1:9109",
                path: "/prometheus/metrics",
                namespace: "dt",
                default_labels: {
                    environment: "production"
                }
            },
            logging: {
                level: "debug",
                format: "json",
                output: "stderr"
            }
        }"#;

        let config = ExporterConfig::parse(json).unwrap();

        assert_eq!(config.api.base_url, "https://api.example.com/v2");
        assert_eq!(config.api.key_id.as_deref(), Some("c0md3pm0p7bet3vico8g"));
        assert_eq!(
            config
                .api
                .key_secret
                .as_ref()
                .map(|s| s.expose_secret().as_str()),
            Some("s3cr3t")
        );
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.prometheus.listen, "127.0.0.1:9109");
        assert_eq!(config.prometheus.path, "/prometheus/metrics");
        assert_eq!(config.prometheus.namespace, "dt");
        assert_eq!(
            config.prometheus.default_labels.get("environment"),
            Some(&"production".to_string())
        );
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.output, LogOutput::Stderr);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ prometheus: {{ listen: \"127.0.0.1:9200\" }} }}").unwrap();

        let config = ExporterConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.prometheus.listen, "127.0.0.1:9200");
    }

    #[test]
    fn test_load_missing_file() {
        let result = ExporterConfig::load_from_file("/nonexistent/d21s-exporter.json5");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_bad_api_url_is_not_a_config_error() {
        let json = r#"{ api: { base_url: "not a url" } }"#;
        assert!(ExporterConfig::parse(json).is_ok());
    }

    #[test]
    fn test_validate_invalid_listen() {
        let json = r#"{
            prometheus: { listen: "not-an-address" }
        }"#;

        let result = ExporterConfig::parse(json);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid listen address")
        );
    }

    #[test]
    fn test_validate_invalid_path() {
        let json = r#"{
            prometheus: { path: "no-leading-slash" }
        }"#;

        let result = ExporterConfig::parse(json);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("must start with /")
        );
    }

    #[test]
    fn test_validate_root_path() {
        let json = r#"{ prometheus: { path: "/" } }"#;
        assert!(ExporterConfig::parse(json).is_err());
    }

    #[test]
    fn test_validate_invalid_namespace() {
        let json = r#"{ prometheus: { namespace: "d21s-exporter" } }"#;
        assert!(ExporterConfig::parse(json).is_err());

        let json = r#"{ prometheus: { namespace: "" } }"#;
        assert!(ExporterConfig::parse(json).is_ok());
    }

    #[test]
    fn test_validate_default_label_clashes_with_name() {
        let json = r#"{ prometheus: { default_labels: { name: "x" } } }"#;
        assert!(ExporterConfig::parse(json).is_err());

        let json = r#"{ prometheus: { default_labels: { "__reserved": "x" } } }"#;
        assert!(ExporterConfig::parse(json).is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let json = r#"{ api: { timeout_secs: 0 } }"#;
        assert!(ExporterConfig::parse(json).is_err());
    }

    #[test]
    fn test_name_checks() {
        assert!(is_valid_metric_name("d21s"));
        assert!(is_valid_metric_name("foo:bar"));
        assert!(!is_valid_metric_name("1abc"));
        assert!(!is_valid_metric_name(""));
        assert!(is_valid_label_name("environment_1"));
        assert!(!is_valid_label_name("foo:bar"));
        assert!(!is_valid_label_name("__meta"));
    }
}
