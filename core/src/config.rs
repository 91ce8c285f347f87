//! # Configuration: Graphs, resources and routes from TOML
//!
//! One file describes the state machine graphs and the API resources. The
//! configuration is loaded once and turned into read-only registries that
//! are then shared by every request.

use crate::error::ConfigError;
use crate::metadata::{ItemOperation, MetadataRegistry, ResourceMetadata};
use crate::routing::{pluralize, route_name, tableize, OperationType, Route, RouteCollection};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use waypost_flow::{GraphDefinition, GraphRegistry};

/// Prefix of every generated API path.
pub const DEFAULT_API_PREFIX: &str = "/new-api";

fn default_prefix() -> String {
    DEFAULT_API_PREFIX.to_string()
}

/// API-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

/// Root of the TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaypostConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub state_machines: Vec<GraphDefinition>,
    #[serde(default)]
    pub resources: Vec<ResourceMetadata>,
}

/// Registries built from a `WaypostConfig`.
#[derive(Debug)]
pub struct ConfiguredApi {
    pub graphs: GraphRegistry,
    pub metadata: MetadataRegistry,
    pub routes: RouteCollection,
}

impl WaypostConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Validate the configuration and build the registries.
    ///
    /// Operations without a path get one derived from the API prefix and
    /// the resource's short name; operations without a route name get the
    /// generated one. The registered metadata carries both.
    pub fn build(&self) -> Result<ConfiguredApi, ConfigError> {
        let graphs = GraphRegistry::new(self.state_machines.clone())?;

        let mut metadata = MetadataRegistry::new();
        let mut routes = RouteCollection::new();
        let mut classes = HashSet::new();

        for resource in &self.resources {
            if !classes.insert(resource.class.as_str()) {
                return Err(ConfigError::DuplicateResource(resource.class.clone()));
            }

            let mut resource = resource.clone();
            if resource.short_name.is_empty() {
                resource.short_name = resource.class.clone();
            }
            let base = format!(
                "{}/{}",
                self.api.prefix.trim_end_matches('/'),
                pluralize(&tableize(&resource.short_name)).replace('_', "-")
            );

            for operation in &mut resource.item_operations {
                complete_operation(operation, &resource.short_name, &base, OperationType::Item);
                routes.add(route_of(operation))?;
            }
            for operation in &mut resource.collection_operations {
                complete_operation(
                    operation,
                    &resource.short_name,
                    &base,
                    OperationType::Collection,
                );
                routes.add(route_of(operation))?;
            }

            tracing::debug!(
                class = %resource.class,
                item_operations = resource.item_operations.len(),
                "Resource configured"
            );
            metadata.insert(resource);
        }

        Ok(ConfiguredApi {
            graphs,
            metadata,
            routes,
        })
    }
}

/// Methods served by the item path itself rather than a sub-path.
const ITEM_METHODS: [&str; 4] = ["get", "put", "patch", "delete"];
const COLLECTION_METHODS: [&str; 2] = ["get", "post"];

fn complete_operation(
    operation: &mut ItemOperation,
    short_name: &str,
    base: &str,
    operation_type: OperationType,
) {
    if operation.path.is_none() {
        let path = match operation_type {
            OperationType::Item if ITEM_METHODS.contains(&operation.name.as_str()) => {
                format!("{}/{{id}}", base)
            }
            OperationType::Item => format!("{}/{{id}}/{}", base, operation.name),
            OperationType::Collection if COLLECTION_METHODS.contains(&operation.name.as_str()) => {
                base.to_string()
            }
            OperationType::Collection => format!("{}/{}", base, operation.name),
        };
        operation.path = Some(path);
    }
    if operation.route_name.is_none() {
        operation.route_name = Some(route_name(&operation.name, short_name, operation_type));
    }
}

fn route_of(operation: &ItemOperation) -> Route {
    Route::new(
        operation.route_name.clone().unwrap_or_default(),
        &operation.method,
        operation.path.clone().unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ResourceMetadataFactory;
    use crate::routing::UrlGenerator;
    use std::io::Write;

    const CONFIG: &str = r#"
[api]
prefix = "/new-api"

[[state_machines]]
class = "ProductReview"
graph = "sylius_product_review"
property_path = "status"
states = ["new", "accepted", "rejected"]

[[state_machines.transitions]]
name = "accept"
from = ["new"]
to = "accepted"

[[state_machines.transitions]]
name = "reject"
from = ["new"]
to = "rejected"

[[resources]]
class = "ProductReview"
short_name = "ProductReview"

[[resources.item_operations]]
name = "get"
method = "GET"

[[resources.item_operations]]
name = "accept"
method = "patch"

[[resources.item_operations]]
name = "reject"
method = "PATCH"
path = "/new-api/reviews/{id}/reject"

[[resources.collection_operations]]
name = "get"
method = "GET"
"#;

    #[test]
    fn test_parse_and_build() {
        let config = WaypostConfig::from_toml_str(CONFIG).unwrap();
        assert_eq!(config.api.prefix, "/new-api");
        assert_eq!(config.state_machines[0].property_path, "status");

        let api = config.build().unwrap();
        assert_eq!(api.graphs.len(), 1);
        assert_eq!(api.routes.len(), 4);

        let metadata = api.metadata.create("ProductReview").unwrap();
        let accept = metadata.item_operation("accept").unwrap();
        assert_eq!(accept.method, "PATCH");
        assert_eq!(accept.path.as_deref(), Some("/new-api/product-reviews/{id}/accept"));
        assert_eq!(
            accept.route_name.as_deref(),
            Some("api_product_reviews_accept_item")
        );

        let get = metadata.item_operation("get").unwrap();
        assert_eq!(get.path.as_deref(), Some("/new-api/product-reviews/{id}"));

        assert_eq!(
            api.routes
                .generate("api_product_reviews_reject_item", &[("id", "3")])
                .unwrap(),
            "/new-api/reviews/3/reject"
        );
        assert_eq!(
            api.routes.get("api_product_reviews_get_collection").unwrap().path,
            "/new-api/product-reviews"
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = WaypostConfig::from_toml_str("").unwrap();
        assert_eq!(config, WaypostConfig::default());
        assert_eq!(config.api.prefix, DEFAULT_API_PREFIX);

        let api = config.build().unwrap();
        assert!(api.graphs.is_empty());
        assert!(api.metadata.is_empty());
        assert!(api.routes.is_empty());
    }

    #[test]
    fn test_invalid_graph_is_rejected() {
        let source = r#"
[[state_machines]]
class = "Payment"
graph = "sylius_payment"
states = ["new"]

[[state_machines.transitions]]
name = "complete"
from = ["new"]
to = "completed"
"#;
        let err = WaypostConfig::from_toml_str(source)
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Flow(_)));
    }

    #[test]
    fn test_duplicate_resource_is_rejected() {
        let source = r#"
[[resources]]
class = "Payment"

[[resources]]
class = "Payment"
"#;
        let err = WaypostConfig::from_toml_str(source)
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateResource(class) if class == "Payment"));
    }

    #[test]
    fn test_parse_error() {
        let err = WaypostConfig::from_toml_str("[[state_machines]]\nclass = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = WaypostConfig::from_path(file.path()).unwrap();
        assert_eq!(config.resources.len(), 1);

        let err = WaypostConfig::from_path(file.path().with_extension("missing")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
