use crate::error::SerializerError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

fn uppercase_method<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|method| method.to_ascii_uppercase())
}

/// An API operation declared for a resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOperation {
    pub name: String,
    /// Upper-cased HTTP method (e.g. `PATCH`)
    #[serde(deserialize_with = "uppercase_method")]
    pub method: String,
    /// Path template, `{id}` standing for the resource identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Explicit route name, overriding the generated one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_name: Option<String>,
}

impl ItemOperation {
    pub fn new(name: impl Into<String>, method: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            method: method.as_ref().to_ascii_uppercase(),
            path: None,
            route_name: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_route_name(mut self, route_name: impl Into<String>) -> Self {
        self.route_name = Some(route_name.into());
        self
    }
}

/// Operations an API declares for one resource class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    /// Class tag of the resource
    pub class: String,
    /// Short name used to build route names (e.g. `ProductReview`)
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub item_operations: Vec<ItemOperation>,
    #[serde(default)]
    pub collection_operations: Vec<ItemOperation>,
}

impl ResourceMetadata {
    pub fn new(class: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            short_name: short_name.into(),
            item_operations: Vec::new(),
            collection_operations: Vec::new(),
        }
    }

    pub fn with_item_operation(mut self, operation: ItemOperation) -> Self {
        self.item_operations.push(operation);
        self
    }

    pub fn with_collection_operation(mut self, operation: ItemOperation) -> Self {
        self.collection_operations.push(operation);
        self
    }

    pub fn item_operation(&self, name: &str) -> Option<&ItemOperation> {
        self.item_operations.iter().find(|op| op.name == name)
    }

    /// Names of the declared item operations, in declaration order.
    pub fn item_operation_names(&self) -> impl Iterator<Item = &str> {
        self.item_operations.iter().map(|op| op.name.as_str())
    }
}

/// Looks up the API metadata of a resource class.
pub trait ResourceMetadataFactory: Send + Sync {
    fn create(&self, class: &str) -> Result<&ResourceMetadata, SerializerError>;
}

/// In-memory metadata keyed by resource class.
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    resources: HashMap<String, ResourceMetadata>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register metadata, replacing any previous entry for the same class.
    pub fn insert(&mut self, metadata: ResourceMetadata) -> Option<ResourceMetadata> {
        self.resources.insert(metadata.class.clone(), metadata)
    }

    pub fn with(mut self, metadata: ResourceMetadata) -> Self {
        self.insert(metadata);
        self
    }

    pub fn contains(&self, class: &str) -> bool {
        self.resources.contains_key(class)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceMetadata> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ResourceMetadataFactory for MetadataRegistry {
    fn create(&self, class: &str) -> Result<&ResourceMetadata, SerializerError> {
        self.resources
            .get(class)
            .ok_or_else(|| SerializerError::ResourceClassNotFound(class.to_string()))
    }
}

impl<M: ResourceMetadataFactory + ?Sized> ResourceMetadataFactory for std::sync::Arc<M> {
    fn create(&self, class: &str) -> Result<&ResourceMetadata, SerializerError> {
        (**self).create(class)
    }
}
