//! # Request: API client requests
//!
//! `ApiRequest` describes one call against the resource API: method, URL,
//! headers, a JSON body built up incrementally and the collection filters.
//! `into_http` turns it into an `http::Request<Bytes>` ready for any client.

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, InvalidHeaderValue};
use http::method::InvalidMethod;
use http::{Method, Request};
use serde_json::{Map, Value};
use thiserror::Error;

/// Prefix of the API under test.
pub const DEFAULT_PREFIX: &str = "/new-api";

pub const JSON: &str = "application/json";
pub const LD_JSON: &str = "application/ld+json";
pub const MERGE_PATCH_JSON: &str = "application/merge-patch+json";

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid value for header {name}: {source}")]
    InvalidHeader {
        name: &'static str,
        #[source]
        source: InvalidHeaderValue,
    },

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(#[from] InvalidMethod),

    #[error("Cannot encode filters: {0}")]
    Filters(#[from] serde_urlencoded::ser::Error),

    #[error("Cannot build request: {0}")]
    Http(#[from] http::Error),
}

/// Builds requests against the API mounted at `prefix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequestFactory {
    prefix: String,
}

impl Default for ApiRequestFactory {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl ApiRequestFactory {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn index(&self, resource: &str, token: &str) -> Result<ApiRequest, RequestError> {
        ApiRequest::new(format!("{}/{}", self.prefix, resource), Method::GET, token, None)
    }

    pub fn sub_resource_index(
        &self,
        resource: &str,
        id: &str,
        sub_resource: &str,
        token: &str,
    ) -> Result<ApiRequest, RequestError> {
        ApiRequest::new(
            format!("{}/{}/{}/{}", self.prefix, resource, id, sub_resource),
            Method::GET,
            token,
            None,
        )
    }

    pub fn show(&self, resource: &str, id: &str, token: &str) -> Result<ApiRequest, RequestError> {
        ApiRequest::new(
            format!("{}/{}/{}", self.prefix, resource, id),
            Method::GET,
            token,
            None,
        )
    }

    pub fn create(&self, resource: &str, token: &str) -> Result<ApiRequest, RequestError> {
        ApiRequest::new(
            format!("{}/{}", self.prefix, resource),
            Method::POST,
            token,
            Some(JSON),
        )
    }

    pub fn update(&self, resource: &str, id: &str, token: &str) -> Result<ApiRequest, RequestError> {
        ApiRequest::new(
            format!("{}/{}/{}", self.prefix, resource, id),
            Method::PUT,
            token,
            Some(LD_JSON),
        )
    }

    pub fn delete(&self, resource: &str, id: &str, token: &str) -> Result<ApiRequest, RequestError> {
        ApiRequest::new(
            format!("{}/{}/{}", self.prefix, resource, id),
            Method::DELETE,
            token,
            None,
        )
    }

    /// PATCH `{prefix}/{resource}/{id}/{transition}` as a JSON merge patch.
    pub fn transition(
        &self,
        resource: &str,
        id: &str,
        transition: &str,
        token: &str,
    ) -> Result<ApiRequest, RequestError> {
        ApiRequest::new(
            format!("{}/{}/{}/{}", self.prefix, resource, id, transition),
            Method::PATCH,
            token,
            Some(MERGE_PATCH_JSON),
        )
    }

    /// Request to an arbitrary URL; the prefix is not applied.
    pub fn custom(&self, url: &str, method: &str, token: &str) -> Result<ApiRequest, RequestError> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
        ApiRequest::new(url.to_string(), method, token, None)
    }
}

/// A request against the resource API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    url: String,
    method: Method,
    headers: HeaderMap,
    content: Map<String, Value>,
    filters: Map<String, Value>,
}

impl ApiRequest {
    fn new(
        url: String,
        method: Method,
        token: &str,
        content_type: Option<&'static str>,
    ) -> Result<Self, RequestError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(LD_JSON));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|source| {
            RequestError::InvalidHeader {
                name: "authorization",
                source,
            }
        })?;
        headers.insert(AUTHORIZATION, bearer);
        if let Some(content_type) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }

        Ok(Self {
            url,
            method,
            headers,
            content: Map::new(),
            filters: Map::new(),
        })
    }

    pub fn index(resource: &str, token: &str) -> Result<Self, RequestError> {
        ApiRequestFactory::default().index(resource, token)
    }

    pub fn sub_resource_index(
        resource: &str,
        id: &str,
        sub_resource: &str,
        token: &str,
    ) -> Result<Self, RequestError> {
        ApiRequestFactory::default().sub_resource_index(resource, id, sub_resource, token)
    }

    pub fn show(resource: &str, id: &str, token: &str) -> Result<Self, RequestError> {
        ApiRequestFactory::default().show(resource, id, token)
    }

    pub fn create(resource: &str, token: &str) -> Result<Self, RequestError> {
        ApiRequestFactory::default().create(resource, token)
    }

    pub fn update(resource: &str, id: &str, token: &str) -> Result<Self, RequestError> {
        ApiRequestFactory::default().update(resource, id, token)
    }

    pub fn delete(resource: &str, id: &str, token: &str) -> Result<Self, RequestError> {
        ApiRequestFactory::default().delete(resource, id, token)
    }

    pub fn transition(
        resource: &str,
        id: &str,
        transition: &str,
        token: &str,
    ) -> Result<Self, RequestError> {
        ApiRequestFactory::default().transition(resource, id, transition, token)
    }

    pub fn custom(url: &str, method: &str, token: &str) -> Result<Self, RequestError> {
        ApiRequestFactory::default().custom(url, method, token)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The body, JSON-encoded. Empty content encodes as `[]`.
    pub fn content(&self) -> String {
        if self.content.is_empty() {
            return "[]".to_string();
        }
        Value::Object(self.content.clone()).to_string()
    }

    pub fn set_content(&mut self, content: Map<String, Value>) {
        self.content = content;
    }

    pub fn update_content(&mut self, values: Map<String, Value>) {
        merge_maps(&mut self.content, values);
    }

    /// Append `sub_resource` to the list stored under `key`.
    pub fn add_sub_resource(&mut self, key: impl Into<String>, sub_resource: Value) {
        let entry = self
            .content
            .entry(key.into())
            .or_insert_with(|| Value::Array(Vec::new()));
        match entry {
            Value::Array(items) => items.push(sub_resource),
            other => *other = Value::Array(vec![sub_resource]),
        }
    }

    pub fn filters(&self) -> &Map<String, Value> {
        &self.filters
    }

    pub fn update_filters(&mut self, filters: Map<String, Value>) {
        merge_maps(&mut self.filters, filters);
    }

    /// URL including the bracket-encoded filters, e.g.
    /// `/new-api/products?order[code]=desc` (percent-encoded).
    pub fn uri(&self) -> Result<String, RequestError> {
        if self.filters.is_empty() {
            return Ok(self.url.clone());
        }

        let mut pairs = Vec::new();
        for (key, value) in &self.filters {
            flatten_filter(key.clone(), value, &mut pairs);
        }
        let query = serde_urlencoded::to_string(&pairs)?;
        let separator = if self.url.contains('?') { '&' } else { '?' };
        Ok(format!("{}{}{}", self.url, separator, query))
    }

    /// Build the HTTP request. The body is empty unless content was set.
    pub fn into_http(self) -> Result<Request<Bytes>, RequestError> {
        let uri = self.uri()?;
        let body = if self.content.is_empty() {
            Bytes::new()
        } else {
            Bytes::from(self.content())
        };

        tracing::debug!(method = %self.method, %uri, body_len = body.len(), "Building API request");

        let mut builder = Request::builder().method(self.method).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            headers.extend(self.headers);
        }
        Ok(builder.body(body)?)
    }
}

/// Merge `update` into `target`, last write wins.
///
/// Where both sides hold a container at the same key the merge recurses:
/// two lists merge index by index, and a list meeting an object is keyed
/// by index (`"0"`, `"1"`, ...) and merged into an object. Any other value
/// in `update` replaces the one in `target`.
pub fn merge_values(target: &mut Value, update: Value) {
    match (target, update) {
        (Value::Object(target), Value::Object(update)) => merge_maps(target, update),
        (Value::Array(target), Value::Array(update)) => {
            for (index, value) in update.into_iter().enumerate() {
                match target.get_mut(index) {
                    Some(existing) => merge_values(existing, value),
                    None => target.push(value),
                }
            }
        }
        (target, update) => {
            if is_container(target) && is_container(&update) {
                let mut merged = into_keyed(target.take());
                merge_maps(&mut merged, into_keyed(update));
                *target = Value::Object(merged);
            } else {
                *target = update;
            }
        }
    }
}

fn is_container(value: &Value) -> bool {
    value.is_object() || value.is_array()
}

fn into_keyed(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        _ => Map::new(),
    }
}

fn merge_maps(target: &mut Map<String, Value>, update: Map<String, Value>) {
    for (key, value) in update {
        match target.get_mut(&key) {
            Some(existing) => merge_values(existing, value),
            None => {
                target.insert(key, value);
            }
        }
    }
}

fn flatten_filter(key: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => pairs.push((key, if *flag { "1" } else { "0" }.to_string())),
        Value::Number(number) => pairs.push((key, number.to_string())),
        Value::String(text) => pairs.push((key, text.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_filter(format!("{}[{}]", key, index), item, pairs);
            }
        }
        Value::Object(map) => {
            for (name, item) in map {
                flatten_filter(format!("{}[{}]", key, name), item, pairs);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_constructors() {
        let index = ApiRequest::index("product-reviews", "token").unwrap();
        assert_eq!(index.url(), "/new-api/product-reviews");
        assert_eq!(index.method(), &Method::GET);
        assert_eq!(index.headers()[ACCEPT], LD_JSON);
        assert_eq!(index.headers()[AUTHORIZATION], "Bearer token");
        assert!(index.headers().get(CONTENT_TYPE).is_none());

        let sub = ApiRequest::sub_resource_index("orders", "42", "shipments", "t").unwrap();
        assert_eq!(sub.url(), "/new-api/orders/42/shipments");

        let show = ApiRequest::show("payments", "7", "t").unwrap();
        assert_eq!(show.url(), "/new-api/payments/7");

        let create = ApiRequest::create("payments", "t").unwrap();
        assert_eq!(create.method(), &Method::POST);
        assert_eq!(create.headers()[CONTENT_TYPE], JSON);

        let update = ApiRequest::update("payments", "7", "t").unwrap();
        assert_eq!(update.method(), &Method::PUT);
        assert_eq!(update.headers()[CONTENT_TYPE], LD_JSON);

        let delete = ApiRequest::delete("payments", "7", "t").unwrap();
        assert_eq!(delete.method(), &Method::DELETE);
        assert_eq!(delete.url(), "/new-api/payments/7");

        let transition = ApiRequest::transition("payments", "7", "complete", "t").unwrap();
        assert_eq!(transition.method(), &Method::PATCH);
        assert_eq!(transition.url(), "/new-api/payments/7/complete");
        assert_eq!(transition.headers()[CONTENT_TYPE], MERGE_PATCH_JSON);
    }

    #[test]
    fn test_custom_request_and_prefix() {
        let custom = ApiRequest::custom("/shop/cart", "patch", "t").unwrap();
        assert_eq!(custom.url(), "/shop/cart");
        assert_eq!(custom.method(), &Method::PATCH);

        let factory = ApiRequestFactory::new("/api/v2/");
        assert_eq!(factory.prefix(), "/api/v2");
        let show = factory.show("payments", "1", "t").unwrap();
        assert_eq!(show.url(), "/api/v2/payments/1");

        assert!(matches!(
            ApiRequest::custom("/x", "GE T", "t"),
            Err(RequestError::InvalidMethod(_))
        ));
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let err = ApiRequest::show("payments", "1", "bad\ntoken").unwrap_err();
        assert!(matches!(err, RequestError::InvalidHeader { name: "authorization", .. }));
    }

    #[test]
    fn test_content_merge_is_last_write_wins() {
        let mut request = ApiRequest::create("products", "t").unwrap();
        request.set_content(object(json!({
            "code": "MUG",
            "translations": {"en_US": {"name": "Mug", "slug": "mug"}},
            "options": ["color", "size"]
        })));

        request.update_content(object(json!({
            "code": "CUP",
            "translations": {"en_US": {"name": "Cup"}, "pl_PL": {"name": "Kubek"}},
            "options": ["material"],
            "enabled": true
        })));

        let content: Value = serde_json::from_str(&request.content()).unwrap();
        assert_eq!(
            content,
            json!({
                "code": "CUP",
                "translations": {
                    "en_US": {"name": "Cup", "slug": "mug"},
                    "pl_PL": {"name": "Kubek"}
                },
                "options": ["material", "size"],
                "enabled": true
            })
        );
    }

    #[test]
    fn test_scalar_replaces_container() {
        let mut target = json!({"a": {"b": 1}});
        merge_values(&mut target, json!({"a": 2}));
        assert_eq!(target, json!({"a": 2}));

        let mut target = json!({"a": 2});
        merge_values(&mut target, json!({"a": [1]}));
        assert_eq!(target, json!({"a": [1]}));
    }

    #[test]
    fn test_list_and_object_merge_by_key() {
        let mut target = json!({"items": {"extra": true}});
        merge_values(&mut target, json!({"items": ["mug", "cup"]}));
        assert_eq!(target, json!({"items": {"extra": true, "0": "mug", "1": "cup"}}));

        let mut target = json!({"items": ["mug", "cup"]});
        merge_values(&mut target, json!({"items": {"1": "plate", "size": "L"}}));
        assert_eq!(target, json!({"items": {"0": "mug", "1": "plate", "size": "L"}}));
    }

    #[test]
    fn test_empty_content_encodes_as_list() {
        let request = ApiRequest::create("orders", "t").unwrap();
        assert_eq!(request.content(), "[]");
    }

    #[test]
    fn test_add_sub_resource() {
        let mut request = ApiRequest::create("orders", "t").unwrap();
        request.add_sub_resource("items", json!({"variant": "MUG", "quantity": 1}));
        request.add_sub_resource("items", json!({"variant": "CUP", "quantity": 2}));

        let content: Value = serde_json::from_str(&request.content()).unwrap();
        assert_eq!(
            content,
            json!({"items": [
                {"variant": "MUG", "quantity": 1},
                {"variant": "CUP", "quantity": 2}
            ]})
        );
    }

    #[test]
    fn test_filters_are_bracket_encoded() {
        let mut request = ApiRequest::index("products", "t").unwrap();
        assert_eq!(request.uri().unwrap(), "/new-api/products");

        request.update_filters(object(json!({"order": {"code": "desc"}})));
        request.update_filters(object(json!({"order": {"name": "asc"}, "enabled": true})));

        assert_eq!(
            request.filters(),
            &object(json!({"order": {"code": "desc", "name": "asc"}, "enabled": true}))
        );
        assert_eq!(
            request.uri().unwrap(),
            "/new-api/products?order%5Bcode%5D=desc&order%5Bname%5D=asc&enabled=1"
        );
    }

    #[test]
    fn test_into_http() {
        let mut request = ApiRequest::transition("payments", "7", "complete", "secret").unwrap();
        request.set_content(object(json!({"note": "paid"})));

        let http = request.into_http().unwrap();
        assert_eq!(http.method(), &Method::PATCH);
        assert_eq!(http.uri().path(), "/new-api/payments/7/complete");
        assert_eq!(http.headers()[AUTHORIZATION], "Bearer secret");
        assert_eq!(http.headers()[CONTENT_TYPE], MERGE_PATCH_JSON);
        assert_eq!(http.body().as_ref(), br#"{"note":"paid"}"#);

        let http = ApiRequest::show("payments", "7", "t").unwrap().into_http().unwrap();
        assert!(http.body().is_empty());
    }
}
