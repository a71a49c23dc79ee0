//! The API operations the exporter depends on.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::model::{ConnectorMetrics, DataConnector, Project};

/// Read-only access to the d21s API.
///
/// Implementations must be safe to call from concurrent scrapes and report
/// every failure as an [`Error`], never by panicking.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// List all projects visible to the service account.
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// List the data connectors of a project, by project resource name.
    async fn list_connectors(&self, project: &str) -> Result<Vec<DataConnector>>;

    /// Fetch the aggregate metrics of a data connector, by resource name.
    async fn connector_metrics(&self, connector: &str) -> Result<ConnectorMetrics>;
}

/// Gateway standing in for a client that could not be constructed.
///
/// Every call fails with [`Error::Unavailable`], so the exporter keeps
/// serving an empty metrics page instead of exiting.
#[derive(Debug, Clone)]
pub struct UnavailableGateway {
    reason: String,
}

impl UnavailableGateway {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Gateway for UnavailableGateway {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        Err(Error::Unavailable(self.reason.clone()))
    }

    async fn list_connectors(&self, _project: &str) -> Result<Vec<DataConnector>> {
        Err(Error::Unavailable(self.reason.clone()))
    }

    async fn connector_metrics(&self, _connector: &str) -> Result<ConnectorMetrics> {
        Err(Error::Unavailable(self.reason.clone()))
    }
}
