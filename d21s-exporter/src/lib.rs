//! Prometheus exporter for Disruptive Technologies (d21s) projects.
//!
//! On every scrape the exporter walks the d21s REST API (projects, the data
//! connectors of each project, the metrics of each connector) and renders
//! the result in the OpenMetrics text format via `prometheus_client`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │   d21s REST API │<────│  D21sCollector  │<────│   HTTP Server   │
//! │    (Gateway)    │     │  (Exposition)   │     │   (/metrics)    │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```bash
//! d21s-exporter --key-id <id> --key-secret <secret>
//! d21s-exporter --config config.json5
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for configuration options.

pub mod collector;
pub mod config;
pub mod exposition;
pub mod http;
pub mod mapping;

pub use collector::{D21sCollector, Desc, Observation, Scrape};
pub use config::ExporterConfig;
pub use exposition::Exposition;
pub use http::{HttpServer, SharedExposition};
