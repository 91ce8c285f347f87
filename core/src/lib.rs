//! Waypost Core - Transition Links for Resource APIs
//!
//! This crate turns state machine graphs and API resource metadata into
//! hypermedia:
//! - `StateMachineTransitionsProvider`: Legal transitions ∩ exposed item operations
//! - `StateMachineTransitionsNormalizer`: Appends `transitions` links to normalized output
//! - `RouteCollection`: Named routes, URL generation and path matching
//! - `WaypostConfig`: Graphs and resources loaded from TOML
//!
//! Core stays protocol-agnostic; request building lives in `waypost-http`.

pub mod config;
pub mod error;
pub mod links;
pub mod metadata;
pub mod normalizer;
pub mod provider;
pub mod resource;
pub mod routing;
pub mod transitions;

pub use config::{ApiConfig, ConfiguredApi, WaypostConfig};
pub use error::{ConfigError, RoutingError, SerializerError};
pub use links::{LinkGenerator, PathTemplateLinks, RouterLinks};
pub use metadata::{ItemOperation, MetadataRegistry, ResourceMetadata, ResourceMetadataFactory};
pub use normalizer::{Denormalizer, ItemNormalizer, Normalizer, SerializerContext};
pub use provider::{ApiTransitionsProvider, StateMachineTransitionsProvider};
pub use resource::{ApiResource, ResourceId};
pub use routing::{OperationType, Route, RouteCollection, RouteMatch, UrlGenerator};
pub use transitions::{StateMachineTransitionsNormalizer, TransitionLink};

pub mod prelude {
    pub use crate::config::WaypostConfig;
    pub use crate::error::{ConfigError, RoutingError, SerializerError};
    pub use crate::links::{LinkGenerator, PathTemplateLinks, RouterLinks};
    pub use crate::metadata::{ItemOperation, MetadataRegistry, ResourceMetadata, ResourceMetadataFactory};
    pub use crate::normalizer::{Denormalizer, ItemNormalizer, Normalizer, SerializerContext};
    pub use crate::provider::{ApiTransitionsProvider, StateMachineTransitionsProvider};
    pub use crate::resource::{ApiResource, ResourceId};
    pub use crate::routing::{RouteCollection, UrlGenerator};
    pub use crate::transitions::{StateMachineTransitionsNormalizer, TransitionLink};
    pub use waypost_flow::prelude::*;
}
