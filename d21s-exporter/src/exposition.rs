//! OpenMetrics exposition of d21s scrapes.
//!
//! Every render runs one scrape and encodes it, together with the exporter
//! build info, through a fresh `prometheus_client` registry.

use std::borrow::Cow;

use prometheus_client::encoding::text;
use prometheus_client::metrics::info::Info;
use prometheus_client::registry::Registry;

use crate::collector::D21sCollector;
use crate::config::PrometheusConfig;
use crate::mapping::build_fq_name;

/// Content type of the rendered exposition.
pub const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

const BUILD_INFO_HELP: &str = "A metric with a constant '1' value labeled by the exporter version";

/// Renders the metrics page.
pub struct Exposition {
    collector: D21sCollector,
    build_info_name: String,
    const_labels: Vec<(String, String)>,
}

impl Exposition {
    pub fn new(collector: D21sCollector, config: &PrometheusConfig) -> Self {
        let mut const_labels: Vec<_> = config
            .default_labels
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        const_labels.sort();

        Self {
            collector,
            // Encoded with an `_info` suffix.
            build_info_name: build_fq_name(&config.namespace, "exporter", "build"),
            const_labels,
        }
    }

    pub fn collector(&self) -> &D21sCollector {
        &self.collector
    }

    fn registry(&self) -> Registry {
        Registry::with_labels(
            self.const_labels
                .iter()
                .map(|(k, v)| (Cow::Owned(k.clone()), Cow::Owned(v.clone()))),
        )
    }

    /// Run one scrape and encode it in the OpenMetrics text format.
    pub async fn render(&self) -> Result<String, std::fmt::Error> {
        let scrape = self.collector.collect().await;

        let mut registry = self.registry();
        registry.register(
            self.build_info_name.clone(),
            BUILD_INFO_HELP,
            Info::new(vec![(
                "version".to_string(),
                env!("CARGO_PKG_VERSION").to_string(),
            )]),
        );
        registry.register_collector(Box::new(scrape));

        let mut body = String::new();
        text::encode(&mut body, &registry)?;
        Ok(body)
    }
}
