//! Collector that turns d21s API snapshots into Prometheus gauges on each scrape.
//!
//! Every scrape walks projects, then the data connectors of each project,
//! then the metrics of each connector. A failed call is logged and only the
//! subtree below it is skipped.
//!
//! The result of a scrape is a [`Scrape`], which implements
//! [`prometheus_client::collector::Collector`] and can be registered into any
//! `prometheus_client` registry.

use std::sync::Arc;

use d21s_common::{ConnectorMetrics, Gateway, Project};
use prometheus_client::collector::Collector;
use prometheus_client::encoding::{DescriptorEncoder, EncodeMetric};
use prometheus_client::metrics::MetricType;
use prometheus_client::metrics::gauge::ConstGauge;
use tracing::{debug, error};

use crate::config::PrometheusConfig;
use crate::mapping::{build_fq_name, latency_seconds};

/// Subsystem of the project-scoped metrics.
pub const PROJECT_SUBSYSTEM: &str = "project";

/// Subsystem of the connector-scoped metrics.
pub const DATACONNECTOR_SUBSYSTEM: &str = "dataconnector";

/// The only label: the display name of the entity a series describes.
pub const LABEL_NAME: &str = "name";

/// A gauge definition: identity plus a projection from a snapshot to its value.
#[derive(Debug, Clone)]
pub struct MetricDef<T> {
    pub subsystem: &'static str,
    pub name: &'static str,
    pub help: &'static str,
    pub value: fn(&T) -> f64,
}

pub const PROJECT_METRICS: [MetricDef<Project>; 2] = [
    MetricDef {
        subsystem: PROJECT_SUBSYSTEM,
        name: "sensor_count",
        help: "The number of sensors within the Project.",
        value: sensor_count,
    },
    MetricDef {
        subsystem: PROJECT_SUBSYSTEM,
        name: "cloud_connector_count",
        help: "The number of Cloud Connectors within the Project.",
        value: cloud_connector_count,
    },
];

pub const CONNECTOR_METRICS: [MetricDef<ConnectorMetrics>; 3] = [
    MetricDef {
        subsystem: DATACONNECTOR_SUBSYSTEM,
        name: "success_count",
        help: "Number of successfully processed events within the last 24 hours.",
        value: success_count,
    },
    MetricDef {
        subsystem: DATACONNECTOR_SUBSYSTEM,
        name: "error_count",
        help: "Number of failed processed events within the last 24 hours.",
        value: error_count,
    },
    MetricDef {
        subsystem: DATACONNECTOR_SUBSYSTEM,
        name: "latency_99_p",
        help: "The 99th percentile latency of events sent within the last 24 hours.",
        value: latency_99p,
    },
];

fn sensor_count(project: &Project) -> f64 {
    f64::from(project.sensor_count)
}

fn cloud_connector_count(project: &Project) -> f64 {
    f64::from(project.cloud_connector_count)
}

fn success_count(metrics: &ConnectorMetrics) -> f64 {
    metrics.success_count as f64
}

fn error_count(metrics: &ConnectorMetrics) -> f64 {
    metrics.error_count as f64
}

/// Seconds, or 0 when the latency string does not parse.
fn latency_99p(metrics: &ConnectorMetrics) -> f64 {
    latency_seconds(&metrics.latency_99p)
}

/// Identity of a metric family, without values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Desc {
    /// Fully qualified name, e.g. `d21s_project_sensor_count`.
    pub name: String,
    pub help: &'static str,
    pub label_names: &'static [&'static str],
}

impl Desc {
    fn new<T>(namespace: &str, def: &MetricDef<T>) -> Self {
        Self {
            name: build_fq_name(namespace, def.subsystem, def.name),
            help: def.help,
            label_names: &[LABEL_NAME],
        }
    }
}

/// One value emitted during a scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Index of the family in [`D21sCollector::describe`].
    pub family: usize,
    /// Value of the `name` label.
    pub display_name: String,
    pub value: f64,
}

/// Observations of one scrape, in emission order.
#[derive(Debug, Clone)]
pub struct Scrape {
    descs: Arc<[Desc]>,
    observations: Vec<Observation>,
}

impl Scrape {
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Family of an observation.
    pub fn desc(&self, observation: &Observation) -> &Desc {
        &self.descs[observation.family]
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Series of one family. A repeated display name keeps the position of its
    /// first observation and the value of its last.
    pub fn series(&self, family: usize) -> Vec<(&str, f64)> {
        let mut series: Vec<(&str, f64)> = Vec::new();
        for observation in self.observations.iter().filter(|o| o.family == family) {
            match series
                .iter_mut()
                .find(|(name, _)| *name == observation.display_name)
            {
                Some(entry) => entry.1 = observation.value,
                None => series.push((&observation.display_name, observation.value)),
            }
        }
        series
    }
}

impl Collector for Scrape {
    fn encode(&self, mut encoder: DescriptorEncoder) -> Result<(), std::fmt::Error> {
        for (family, desc) in self.descs.iter().enumerate() {
            let series = self.series(family);
            if series.is_empty() {
                continue;
            }

            let mut metric_encoder =
                encoder.encode_descriptor(&desc.name, desc.help, None, MetricType::Gauge)?;
            for (display_name, value) in series {
                let labels = [(LABEL_NAME, display_name)];
                let sample_encoder = metric_encoder.encode_family(&labels)?;
                ConstGauge::new(value).encode(sample_encoder)?;
            }
        }
        Ok(())
    }
}

/// Collector for d21s projects and data connectors.
///
/// Holds no state between scrapes; the descriptor table is frozen at
/// construction and shared by concurrent scrapes.
pub struct D21sCollector {
    gateway: Arc<dyn Gateway>,
    descs: Arc<[Desc]>,
}

impl D21sCollector {
    /// Create a new collector. Performs no I/O.
    pub fn new(gateway: Arc<dyn Gateway>, config: &PrometheusConfig) -> Self {
        let descs = PROJECT_METRICS
            .iter()
            .map(|def| Desc::new(&config.namespace, def))
            .chain(
                CONNECTOR_METRICS
                    .iter()
                    .map(|def| Desc::new(&config.namespace, def)),
            )
            .collect();

        Self { gateway, descs }
    }

    /// Identity of every metric this collector can emit: project metrics
    /// first, then connector metrics.
    pub fn describe(&self) -> &[Desc] {
        &self.descs
    }

    /// Run one scrape against the gateway.
    pub async fn collect(&self) -> Scrape {
        debug!("Starting scrape");

        let mut scrape = Scrape {
            descs: self.descs.clone(),
            observations: Vec::new(),
        };

        let projects = match self.gateway.list_projects().await {
            Ok(projects) => projects,
            Err(e) => {
                error!(error = %e, "Error getting projects");
                return scrape;
            }
        };

        let mut connectors_scraped = 0usize;

        for project in &projects {
            for (family, def) in PROJECT_METRICS.iter().enumerate() {
                scrape.observations.push(Observation {
                    family,
                    display_name: project.display_name.clone(),
                    value: (def.value)(project),
                });
            }

            let connectors = match self.gateway.list_connectors(&project.name).await {
                Ok(connectors) => connectors,
                Err(e) => {
                    error!(project = %project.name, error = %e, "Error getting connectors");
                    continue;
                }
            };

            for connector in &connectors {
                let metrics = match self.gateway.connector_metrics(&connector.name).await {
                    Ok(metrics) => metrics,
                    Err(e) => {
                        error!(
                            connector = %connector.name,
                            error = %e,
                            "Error getting connector metrics"
                        );
                        continue;
                    }
                };

                for (offset, def) in CONNECTOR_METRICS.iter().enumerate() {
                    scrape.observations.push(Observation {
                        family: PROJECT_METRICS.len() + offset,
                        display_name: connector.display_name.clone(),
                        value: (def.value)(&metrics),
                    });
                }
                connectors_scraped += 1;
            }
        }

        debug!(
            projects = projects.len(),
            connectors = connectors_scraped,
            observations = scrape.len(),
            "Scrape finished"
        );

        scrape
    }
}
