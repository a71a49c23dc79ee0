use serde::{Deserialize, Serialize};

/// A project snapshot as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Resource name (e.g., "projects/c0md3mm0c7bet3vico8g").
    pub name: String,

    /// Human-readable project name.
    #[serde(default)]
    pub display_name: String,

    /// Number of sensors in the project.
    #[serde(default)]
    pub sensor_count: u32,

    /// Number of Cloud Connectors in the project.
    #[serde(default)]
    pub cloud_connector_count: u32,
}

impl Project {
    /// Create a new project snapshot.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        sensor_count: u32,
        cloud_connector_count: u32,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            sensor_count,
            cloud_connector_count,
        }
    }
}

/// A data connector snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataConnector {
    /// Resource name (e.g., "projects/abc/dataconnectors/def").
    pub name: String,

    /// Human-readable connector name.
    #[serde(default)]
    pub display_name: String,
}

impl DataConnector {
    /// Create a new data connector snapshot.
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
        }
    }
}

/// Aggregate metrics of a data connector over the last 24 hours.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorMetrics {
    /// Successfully delivered events.
    #[serde(default)]
    pub success_count: u64,

    /// Events that failed to deliver.
    #[serde(default)]
    pub error_count: u64,

    /// 99th percentile latency as a duration string (e.g., "0.169s").
    #[serde(default, rename = "latency99p")]
    pub latency_99p: String,
}

impl ConnectorMetrics {
    /// Create a new connector metrics snapshot.
    pub fn new(success_count: u64, error_count: u64, latency_99p: impl Into<String>) -> Self {
        Self {
            success_count,
            error_count,
            latency_99p: latency_99p.into(),
        }
    }
}

/// One page of `GET /projects`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPage {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub next_page_token: String,
}

/// One page of `GET /{project}/dataconnectors`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataConnectorPage {
    #[serde(default)]
    pub data_connectors: Vec<DataConnector>,
    #[serde(default)]
    pub next_page_token: String,
}

/// Body of `GET /{connector}:metrics`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectorMetricsResponse {
    #[serde(default)]
    pub metrics: ConnectorMetrics,
}
