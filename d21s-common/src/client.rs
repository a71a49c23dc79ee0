//! HTTP client for the d21s REST API.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::gateway::Gateway;
use crate::model::{
    ConnectorMetrics, ConnectorMetricsResponse, DataConnector, DataConnectorPage, Project,
    ProjectPage,
};

/// [`Gateway`] backed by the d21s REST API.
///
/// Authenticates every request with the service account key id and secret
/// (HTTP basic auth). Requests are not retried.
#[derive(Clone)]
pub struct HttpGateway {
    http: Client,
    base_url: Url,
    key_id: String,
    key_secret: SecretString,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url)
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .finish()
    }
}

impl HttpGateway {
    /// Build a client from the API configuration.
    ///
    /// Fails if the base URL is invalid or the credentials are missing.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "API base URL cannot be a base: {}",
                config.base_url
            )));
        }

        let key_id = config
            .key_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Config("service account key id is not set".to_string()))?;

        let key_secret = config
            .key_secret
            .clone()
            .ok_or_else(|| Error::Config("service account secret is not set".to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("d21s-exporter/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            key_id,
            key_secret,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a resource path (e.g. "projects/abc/dataconnectors") against the base URL.
    fn url(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!(
            "{}/{}",
            base,
            path.trim_start_matches('/')
        ))?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, page_token: Option<&str>) -> Result<T> {
        let url = self.url(path)?;
        trace!(url = %url, "GET");

        let mut request = self
            .http
            .get(url)
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()));
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

/// Extract the `error` field of an API error body, falling back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Page tokens of one listing.
#[derive(Debug, Default)]
struct Pagination {
    current: Option<String>,
    seen: HashSet<String>,
}

impl Pagination {
    /// Token to request the current page with; `None` for the first page.
    fn token(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Move to the next page. Returns `false` on the last page, or when the
    /// API hands out a token it already returned during this listing.
    fn advance(&mut self, next: String) -> bool {
        if next.is_empty() {
            return false;
        }
        if !self.seen.insert(next.clone()) {
            warn!(token = %next, "Page token repeated, stopping pagination");
            return false;
        }
        self.current = Some(next);
        true
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let mut projects = Vec::new();
        let mut pages = Pagination::default();

        loop {
            let page: ProjectPage = self.get("projects", pages.token()).await?;
            projects.extend(page.projects);

            if !pages.advance(page.next_page_token) {
                break;
            }
        }

        debug!(count = projects.len(), "Listed projects");
        Ok(projects)
    }

    async fn list_connectors(&self, project: &str) -> Result<Vec<DataConnector>> {
        let path = format!("{}/dataconnectors", project);
        let mut connectors = Vec::new();
        let mut pages = Pagination::default();

        loop {
            let page: DataConnectorPage = self.get(&path, pages.token()).await?;
            connectors.extend(page.data_connectors);

            if !pages.advance(page.next_page_token) {
                break;
            }
        }

        debug!(project, count = connectors.len(), "Listed data connectors");
        Ok(connectors)
    }

    async fn connector_metrics(&self, connector: &str) -> Result<ConnectorMetrics> {
        let response: ConnectorMetricsResponse =
            self.get(&format!("{}:metrics", connector), None).await?;
        Ok(response.metrics)
    }
}
