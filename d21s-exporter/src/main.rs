//! Prometheus exporter for d21s projects and data connectors.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use d21s_common::config::{LogFormat, LogOutput};
use d21s_common::{Gateway, HttpGateway, UnavailableGateway, init_tracing};
use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{error, info};

use d21s_exporter::{D21sCollector, ExporterConfig, Exposition, HttpServer};

/// Prometheus exporter for d21s projects and data connectors.
#[derive(Parser, Debug)]
#[command(name = "d21s-exporter")]
#[command(about = "Export d21s project and data connector metrics for Prometheus")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<String>,

    /// HTTP listen address (overrides config).
    #[arg(long)]
    listen: Option<String>,

    /// Path under which to expose metrics (overrides config).
    #[arg(long)]
    metrics_path: Option<String>,

    /// Base URL of the d21s REST API (overrides config).
    #[arg(long)]
    api_url: Option<String>,

    /// Service account key id (overrides config).
    #[arg(long)]
    key_id: Option<String>,

    /// Service account secret (overrides config).
    #[arg(long)]
    key_secret: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (text, json).
    #[arg(long, value_parser = ["text", "json"])]
    log_format: Option<String>,

    /// Log output (stdout, stderr).
    #[arg(long, value_parser = ["stdout", "stderr"])]
    log_output: Option<String>,
}

impl Args {
    /// Apply command line overrides on top of the loaded configuration.
    fn apply(self, config: &mut ExporterConfig) {
        if let Some(listen) = self.listen {
            config.prometheus.listen = listen;
        }
        if let Some(path) = self.metrics_path {
            config.prometheus.path = path;
        }
        if let Some(url) = self.api_url {
            config.api.base_url = url;
        }
        if let Some(key_id) = self.key_id {
            config.api.key_id = Some(key_id);
        }
        if let Some(secret) = self.key_secret {
            config.api.key_secret = Some(SecretString::new(secret));
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        match self.log_format.as_deref() {
            Some("json") => config.logging.format = LogFormat::Json,
            Some("text") => config.logging.format = LogFormat::Text,
            _ => {}
        }
        match self.log_output.as_deref() {
            Some("stderr") => config.logging.output = LogOutput::Stderr,
            Some("stdout") => config.logging.output = LogOutput::Stdout,
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        ExporterConfig::load_from_file(config_path)?
    } else {
        ExporterConfig::default()
    };

    args.apply(&mut config);
    config.validate()?;

    init_tracing(&config.logging)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting d21s exporter");

    // A client that cannot be built leaves every scrape empty instead of exiting.
    let gateway: Arc<dyn Gateway> = match HttpGateway::new(&config.api) {
        Ok(client) => {
            info!(base_url = %client.base_url(), "d21s API client ready");
            Arc::new(client)
        }
        Err(e) => {
            error!(error = %e, "Failed creating d21s client");
            Arc::new(UnavailableGateway::new(e.to_string()))
        }
    };

    let collector = D21sCollector::new(gateway, &config.prometheus);
    let exposition = Exposition::new(collector, &config.prometheus);

    // Parse listen address
    let listen_addr = config
        .prometheus
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let http_server = HttpServer::new(
        Arc::new(exposition),
        listen_addr,
        config.prometheus.path.clone(),
    );
    let mut http_task = tokio::spawn(async move { http_server.run(shutdown_rx).await });

    // Wait for shutdown signal, or the server failing on its own
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate() => {
            info!("Received SIGTERM, shutting down...");
        }
        result = &mut http_task => {
            return match result {
                Ok(result) => result,
                Err(e) => Err(anyhow::anyhow!("HTTP server task failed: {}", e)),
            };
        }
    }

    shutdown_tx.send(true)?;

    match tokio::time::timeout(Duration::from_secs(5), http_task).await {
        Ok(Ok(Err(e))) => error!("HTTP server error: {}", e),
        Ok(Err(e)) => error!("HTTP server task failed: {}", e),
        Ok(Ok(Ok(()))) => {}
        Err(_) => error!("HTTP server did not stop in time"),
    }

    info!("Exporter stopped");
    Ok(())
}

async fn terminate() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        std::future::pending::<()>().await;
    }
}
