//! # Transitions: Hypermedia links for workflow-driven resources
//!
//! `StateMachineTransitionsNormalizer` decorates any `Normalizer` and, when
//! the resource has transitions that are both legal and exposed, appends
//!
//! ```json
//! "transitions": [
//!     {"name": "accept", "href": "/new-api/product-reviews/123/accept", "method": "PATCH"}
//! ]
//! ```
//!
//! to the normalized object. Every other capability is delegated untouched.

use crate::error::SerializerError;
use crate::links::LinkGenerator;
use crate::metadata::{ResourceMetadata, ResourceMetadataFactory};
use crate::normalizer::{Denormalizer, Normalizer, SerializerContext};
use crate::provider::ApiTransitionsProvider;
use crate::resource::{ApiResource, ResourceId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Key under which rendered transitions are appended.
pub const TRANSITIONS_KEY: &str = "transitions";

/// Key read from the normalized output to build links.
pub const IDENTIFIER_KEY: &str = "id";

/// A transition offered to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionLink {
    pub name: String,
    pub href: String,
    pub method: String,
}

impl TransitionLink {
    pub fn to_value(&self) -> Value {
        json!({
            "name": self.name,
            "href": self.href,
            "method": self.method,
        })
    }
}

/// Build the links of `transitions`, in order.
///
/// Fails on the first transition that is not declared as an item operation
/// of `metadata`.
pub fn transition_links(
    transitions: &[String],
    metadata: &ResourceMetadata,
    id: &ResourceId,
    links: &dyn LinkGenerator,
) -> Result<Vec<TransitionLink>, SerializerError> {
    transitions
        .iter()
        .map(|name| -> Result<TransitionLink, SerializerError> {
            let operation = metadata.item_operation(name).ok_or_else(|| {
                SerializerError::UndeclaredTransition {
                    resource: metadata.class.clone(),
                    transition: name.clone(),
                }
            })?;
            Ok(TransitionLink {
                name: name.clone(),
                href: links.generate(operation, metadata, id)?,
                method: operation.method.clone(),
            })
        })
        .collect()
}

/// Append the `transitions` section to an already normalized object.
///
/// With no transitions the object is returned unchanged, without an empty
/// `transitions` key.
pub fn render_transitions(
    mut data: Map<String, Value>,
    transitions: &[String],
    metadata: &ResourceMetadata,
    id: &ResourceId,
    links: &dyn LinkGenerator,
) -> Result<Map<String, Value>, SerializerError> {
    if transitions.is_empty() {
        return Ok(data);
    }

    let rendered = transition_links(transitions, metadata, id, links)?;
    data.insert(
        TRANSITIONS_KEY.to_string(),
        Value::Array(rendered.iter().map(TransitionLink::to_value).collect()),
    );
    Ok(data)
}

/// Decorates a normalizer with state machine transition links.
pub struct StateMachineTransitionsNormalizer<N> {
    inner: N,
    metadata: Arc<dyn ResourceMetadataFactory>,
    provider: Arc<dyn ApiTransitionsProvider>,
    links: Arc<dyn LinkGenerator>,
}

impl<N> StateMachineTransitionsNormalizer<N> {
    pub fn new(
        inner: N,
        metadata: Arc<dyn ResourceMetadataFactory>,
        provider: Arc<dyn ApiTransitionsProvider>,
        links: Arc<dyn LinkGenerator>,
    ) -> Self {
        Self {
            inner,
            metadata,
            provider,
            links,
        }
    }

    /// The decorated normalizer
    pub fn inner(&self) -> &N {
        &self.inner
    }

    pub fn into_inner(self) -> N {
        self.inner
    }
}

impl<N: Normalizer> Normalizer for StateMachineTransitionsNormalizer<N> {
    fn supports_normalization(&self, object: &dyn ApiResource, format: Option<&str>) -> bool {
        self.inner.supports_normalization(object, format)
    }

    fn normalize(
        &self,
        object: &dyn ApiResource,
        format: Option<&str>,
        context: &SerializerContext,
    ) -> Result<Value, SerializerError> {
        let normalized = self.inner.normalize(object, format, context)?;

        let class = object.resource_class();
        let metadata = self.metadata.create(class)?;
        let transitions = self.provider.possible_api_transitions(object, metadata);
        if transitions.is_empty() {
            return Ok(normalized);
        }

        let Value::Object(data) = normalized else {
            let error = SerializerError::NotAnObject(class.to_string());
            tracing::error!(class, %error, "Cannot render transitions");
            return Err(error);
        };
        let Some(id) = data.get(IDENTIFIER_KEY).and_then(ResourceId::from_value) else {
            let error = SerializerError::MissingIdentifier(class.to_string());
            tracing::error!(class, %error, "Cannot render transitions");
            return Err(error);
        };

        render_transitions(data, &transitions, metadata, &id, self.links.as_ref())
            .map(Value::Object)
            .inspect_err(|error| {
                tracing::error!(class, %id, %error, "Cannot render transitions");
            })
    }
}

impl<N: Denormalizer> Denormalizer for StateMachineTransitionsNormalizer<N> {
    fn supports_denormalization(&self, data: &Value, class: &str, format: Option<&str>) -> bool {
        self.inner.supports_denormalization(data, class, format)
    }

    fn denormalize(
        &self,
        data: Value,
        class: &str,
        format: Option<&str>,
        context: &SerializerContext,
    ) -> Result<Box<dyn ApiResource>, SerializerError> {
        self.inner.denormalize(data, class, format, context)
    }
}
