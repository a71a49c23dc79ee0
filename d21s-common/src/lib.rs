//! d21s Common Library
//!
//! This crate provides the pieces of the d21s exporter that talk to the
//! Disruptive Technologies REST API:
//!
//! - [`model`] - API snapshots (`Project`, `DataConnector`, `ConnectorMetrics`)
//! - [`gateway`] - The `Gateway` trait the exporter collects through
//! - [`client`] - `HttpGateway`, the reqwest-backed implementation
//! - [`config`] - API and logging configuration sections
//! - [`error`] - Error types

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;

// Re-export commonly used types at the crate root
pub use client::HttpGateway;
pub use config::{ApiConfig, LogFormat, LogOutput, LoggingConfig};
pub use error::{Error, Result};
pub use gateway::{Gateway, UnavailableGateway};
pub use model::{ConnectorMetrics, DataConnector, Project};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// `RUST_LOG` takes precedence over `config.level` when set.
///
/// # Example
///
/// ```ignore
/// use d21s_common::{LoggingConfig, LogFormat, init_tracing};
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Json,
///     ..Default::default()
/// };
/// init_tracing(&config)?;
/// ```
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::fmt::writer::BoxMakeWriter;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let writer = match config.output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
    };

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer))
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_writer(writer))
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
