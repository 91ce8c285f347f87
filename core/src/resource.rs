//! # Resources: What the API serializes
//!
//! An API resource is any `Stateful` object that can also be turned into
//! JSON. Every `Stateful + Serialize` type qualifies automatically.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use waypost_flow::Stateful;

/// A stateful object exposed through the API.
pub trait ApiResource: Stateful + Send + Sync {
    /// Plain JSON representation, before any decoration.
    fn to_json(&self) -> Result<Value, serde_json::Error>;
}

impl<T> ApiResource for T
where
    T: Stateful + Serialize + Send + Sync,
{
    fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl fmt::Debug for dyn ApiResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiResource")
            .field("class", &self.resource_class())
            .finish()
    }
}

/// Identifier of a resource, as found in its normalized `id` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Int(i64),
    UInt(u64),
    Str(String),
}

impl ResourceId {
    /// Read an identifier from a JSON value.
    ///
    /// Only integers and non-empty strings are accepted.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(ResourceId::Int)
                .or_else(|| n.as_u64().map(ResourceId::UInt)),
            Value::String(s) if !s.is_empty() => Some(ResourceId::Str(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Int(id) => write!(f, "{}", id),
            ResourceId::UInt(id) => write!(f, "{}", id),
            ResourceId::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Int(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId::Str(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        ResourceId::Str(id)
    }
}
