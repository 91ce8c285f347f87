//! # Normalizer: The generic serializer capability
//!
//! `Normalizer` turns resources into JSON, `Denormalizer` turns JSON back
//! into resources. Decorators wrap an existing implementation and augment
//! one direction while delegating the rest.

use crate::error::SerializerError;
use crate::resource::ApiResource;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Options carried through a (de)normalization call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializerContext {
    /// Top-level attributes left out of the normalized output
    pub ignored_attributes: Vec<String>,
}

impl SerializerContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignoring(mut self, attribute: impl Into<String>) -> Self {
        self.ignored_attributes.push(attribute.into());
        self
    }
}

/// Resource -> JSON.
pub trait Normalizer: Send + Sync {
    fn supports_normalization(&self, object: &dyn ApiResource, format: Option<&str>) -> bool;

    fn normalize(
        &self,
        object: &dyn ApiResource,
        format: Option<&str>,
        context: &SerializerContext,
    ) -> Result<Value, SerializerError>;
}

/// JSON -> resource.
pub trait Denormalizer: Send + Sync {
    fn supports_denormalization(&self, data: &Value, class: &str, format: Option<&str>) -> bool;

    fn denormalize(
        &self,
        data: Value,
        class: &str,
        format: Option<&str>,
        context: &SerializerContext,
    ) -> Result<Box<dyn ApiResource>, SerializerError>;
}

type DenormalizeFn =
    Box<dyn Fn(Value) -> Result<Box<dyn ApiResource>, serde_json::Error> + Send + Sync>;

/// Default JSON (de)normalizer for resources.
///
/// Normalization goes through `serde`. Denormalization needs each class to
/// be registered with its concrete type first.
pub struct ItemNormalizer {
    formats: Vec<String>,
    classes: HashMap<String, DenormalizeFn>,
}

impl ItemNormalizer {
    /// Formats handled unless configured otherwise. `None` is always accepted.
    pub const DEFAULT_FORMATS: [&'static str; 2] = ["json", "jsonld"];

    pub fn new() -> Self {
        Self {
            formats: Self::DEFAULT_FORMATS.iter().map(|f| f.to_string()).collect(),
            classes: HashMap::new(),
        }
    }

    /// Replace the list of supported formats.
    pub fn with_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.formats = formats.into_iter().map(Into::into).collect();
        self
    }

    /// Make `class` denormalizable into `T`.
    pub fn register<T>(mut self, class: impl Into<String>) -> Self
    where
        T: ApiResource + DeserializeOwned + 'static,
    {
        self.classes.insert(
            class.into(),
            Box::new(|data| {
                serde_json::from_value::<T>(data).map(|resource| Box::new(resource) as Box<dyn ApiResource>)
            }),
        );
        self
    }

    fn supports_format(&self, format: Option<&str>) -> bool {
        format.is_none_or(|format| self.formats.iter().any(|f| f == format))
    }

    fn ensure_format(&self, format: Option<&str>) -> Result<(), SerializerError> {
        match format {
            Some(format) if !self.supports_format(Some(format)) => {
                Err(SerializerError::UnsupportedFormat(format.to_string()))
            }
            _ => Ok(()),
        }
    }
}

impl Default for ItemNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ItemNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemNormalizer")
            .field("formats", &self.formats)
            .field("classes", &self.classes.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Normalizer for ItemNormalizer {
    fn supports_normalization(&self, _object: &dyn ApiResource, format: Option<&str>) -> bool {
        self.supports_format(format)
    }

    fn normalize(
        &self,
        object: &dyn ApiResource,
        format: Option<&str>,
        context: &SerializerContext,
    ) -> Result<Value, SerializerError> {
        self.ensure_format(format)?;

        let mut value = object.to_json()?;
        if let Value::Object(map) = &mut value {
            map.retain(|key, _| !context.ignored_attributes.contains(key));
        }
        Ok(value)
    }
}

impl Denormalizer for ItemNormalizer {
    fn supports_denormalization(&self, data: &Value, class: &str, format: Option<&str>) -> bool {
        data.is_object() && self.supports_format(format) && self.classes.contains_key(class)
    }

    fn denormalize(
        &self,
        mut data: Value,
        class: &str,
        format: Option<&str>,
        context: &SerializerContext,
    ) -> Result<Box<dyn ApiResource>, SerializerError> {
        self.ensure_format(format)?;

        let build = self
            .classes
            .get(class)
            .ok_or_else(|| SerializerError::UnknownClass(class.to_string()))?;

        if let Value::Object(map) = &mut data {
            map.retain(|key, _| !context.ignored_attributes.contains(key));
        }
        Ok(build(data)?)
    }
}
