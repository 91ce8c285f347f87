use std::path::PathBuf;
use thiserror::Error;
use waypost_flow::FlowError;

/// Failures raised while normalizing, denormalizing or decorating a
/// resource representation.
#[derive(Error, Debug)]
pub enum SerializerError {
    #[error("resource class `{0}` has no API metadata")]
    ResourceClassNotFound(String),

    #[error("transition `{transition}` is not declared as an item operation of `{resource}`")]
    UndeclaredTransition {
        resource: String,
        transition: String,
    },

    #[error("item operation `{operation}` of `{resource}` has no path template")]
    MissingPath { resource: String, operation: String },

    #[error("normalized `{0}` has no usable `id`")]
    MissingIdentifier(String),

    #[error("normalized `{0}` is not a JSON object")]
    NotAnObject(String),

    #[error("format `{0}` is not supported")]
    UnsupportedFormat(String),

    #[error("no denormalizer is registered for `{0}`")]
    UnknownClass(String),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Failures raised by the route collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("route `{0}` does not exist")]
    RouteNotFound(String),

    #[error("route `{0}` is declared twice")]
    DuplicateRoute(String),

    #[error("route `{route}` requires parameter `{parameter}`")]
    MissingParameter { route: String, parameter: String },

    #[error("route `{route}` has an unterminated placeholder in `{path}`")]
    MalformedPath { route: String, path: String },

    #[error("route `{route}` conflicts with an existing route: {reason}")]
    Conflict { route: String, reason: String },

    #[error("cannot encode query parameters for `{route}`: {reason}")]
    Query { route: String, reason: String },
}

/// Failures raised while loading or assembling configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read configuration file `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid state machine configuration: {0}")]
    Flow(#[from] FlowError),

    #[error("invalid route configuration: {0}")]
    Routing(#[from] RoutingError),

    #[error("resource class `{0}` is declared twice")]
    DuplicateResource(String),
}
