//! # Api: The assembled transition pipeline
//!
//! `Waypost` owns the registries built from a `WaypostConfig` and hands out
//! normalizers decorated with transition links resolved through them.

use std::path::Path;
use std::sync::Arc;
use waypost_core::config::{ConfiguredApi, WaypostConfig};
use waypost_core::error::ConfigError;
use waypost_core::links::RouterLinks;
use waypost_core::metadata::MetadataRegistry;
use waypost_core::normalizer::{ItemNormalizer, Normalizer};
use waypost_core::provider::{ApiTransitionsProvider, StateMachineTransitionsProvider};
use waypost_core::routing::RouteCollection;
use waypost_core::transitions::StateMachineTransitionsNormalizer;
use waypost_flow::GraphRegistry;

/// Links resolved through the configured routes.
pub type ConfiguredLinks = RouterLinks<Arc<RouteCollection>>;

/// Read-only registries and the transitions provider over them.
#[derive(Clone)]
pub struct Waypost {
    prefix: String,
    graphs: Arc<GraphRegistry>,
    metadata: Arc<MetadataRegistry>,
    routes: Arc<RouteCollection>,
    provider: Arc<StateMachineTransitionsProvider>,
}

impl Waypost {
    pub fn from_config(config: &WaypostConfig) -> Result<Self, ConfigError> {
        let ConfiguredApi {
            graphs,
            metadata,
            routes,
        } = config.build()?;

        let graphs = Arc::new(graphs);
        let provider = Arc::new(StateMachineTransitionsProvider::from_registry(graphs.clone()));

        tracing::info!(
            graphs = graphs.len(),
            resources = metadata.len(),
            routes = routes.len(),
            "Waypost configured"
        );

        Ok(Self {
            prefix: config.api.prefix.clone(),
            graphs,
            metadata: Arc::new(metadata),
            routes: Arc::new(routes),
            provider,
        })
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Self::from_config(&WaypostConfig::from_toml_str(source)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_config(&WaypostConfig::from_path(path)?)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn graphs(&self) -> &GraphRegistry {
        &self.graphs
    }

    pub fn metadata(&self) -> &MetadataRegistry {
        &self.metadata
    }

    pub fn routes(&self) -> &RouteCollection {
        &self.routes
    }

    pub fn provider(&self) -> Arc<dyn ApiTransitionsProvider> {
        self.provider.clone()
    }

    pub fn links(&self) -> ConfiguredLinks {
        RouterLinks::new(self.routes.clone())
    }

    /// Decorate `inner` with transition links.
    pub fn decorate<N: Normalizer>(&self, inner: N) -> StateMachineTransitionsNormalizer<N> {
        StateMachineTransitionsNormalizer::new(
            inner,
            self.metadata.clone(),
            self.provider(),
            Arc::new(self.links()),
        )
    }

    /// Decorated default JSON normalizer.
    pub fn normalizer(&self) -> StateMachineTransitionsNormalizer<ItemNormalizer> {
        self.decorate(ItemNormalizer::new())
    }

    /// Request builders for the configured API prefix.
    #[cfg(feature = "http")]
    pub fn requests(&self) -> waypost_http::ApiRequestFactory {
        waypost_http::ApiRequestFactory::new(self.prefix.clone())
    }
}

impl std::fmt::Debug for Waypost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Waypost")
            .field("prefix", &self.prefix)
            .field("graphs", &self.graphs.len())
            .field("resources", &self.metadata.len())
            .field("routes", &self.routes.len())
            .finish()
    }
}
