//! # Links: Turning operation descriptors into hrefs
//!
//! Two strategies are provided:
//!
//! * `PathTemplateLinks` fills `{id}` in the operation's own path template.
//! * `RouterLinks` resolves the operation's route name and asks a
//!   `UrlGenerator` for the URL.

use crate::error::SerializerError;
use crate::metadata::{ItemOperation, ResourceMetadata};
use crate::resource::ResourceId;
use crate::routing::{encode_path_segment, route_name, OperationType, UrlGenerator};

/// Generates the href of an item operation for one resource.
pub trait LinkGenerator: Send + Sync {
    fn generate(
        &self,
        operation: &ItemOperation,
        metadata: &ResourceMetadata,
        id: &ResourceId,
    ) -> Result<String, SerializerError>;
}

impl<L: LinkGenerator + ?Sized> LinkGenerator for std::sync::Arc<L> {
    fn generate(
        &self,
        operation: &ItemOperation,
        metadata: &ResourceMetadata,
        id: &ResourceId,
    ) -> Result<String, SerializerError> {
        (**self).generate(operation, metadata, id)
    }
}

/// Substitutes `{id}` in the operation's path template.
///
/// The identifier is percent-encoded as a path segment. Templates without
/// a placeholder are used verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathTemplateLinks;

impl LinkGenerator for PathTemplateLinks {
    fn generate(
        &self,
        operation: &ItemOperation,
        metadata: &ResourceMetadata,
        id: &ResourceId,
    ) -> Result<String, SerializerError> {
        let path = operation
            .path
            .as_deref()
            .ok_or_else(|| SerializerError::MissingPath {
                resource: metadata.class.clone(),
                operation: operation.name.clone(),
            })?;
        Ok(path.replace("{id}", &encode_path_segment(&id.to_string())))
    }
}

/// Generates links through named routes.
#[derive(Debug, Clone)]
pub struct RouterLinks<U> {
    urls: U,
}

impl<U: UrlGenerator> RouterLinks<U> {
    pub fn new(urls: U) -> Self {
        Self { urls }
    }

    /// Route serving `operation`: its explicit route name, or the generated
    /// item route name.
    pub fn route_for(operation: &ItemOperation, metadata: &ResourceMetadata) -> String {
        operation
            .route_name
            .clone()
            .unwrap_or_else(|| route_name(&operation.name, &metadata.short_name, OperationType::Item))
    }
}

impl<U: UrlGenerator> LinkGenerator for RouterLinks<U> {
    fn generate(
        &self,
        operation: &ItemOperation,
        metadata: &ResourceMetadata,
        id: &ResourceId,
    ) -> Result<String, SerializerError> {
        let route = Self::route_for(operation, metadata);
        let id = id.to_string();
        Ok(self.urls.generate(&route, &[("id", id.as_str())])?)
    }
}
