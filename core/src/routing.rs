//! # Routing: Route names, URL generation and path matching
//!
//! Route names for resource operations follow one convention:
//! `api_{plural table name}_{operation}_{item|collection}`.
//! Paths use `{param}` placeholders, the same syntax `matchit` matches on.

use crate::error::RoutingError;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use std::collections::HashMap;

/// Prefix shared by every generated route name.
pub const ROUTE_NAME_PREFIX: &str = "api_";

/// Whether an operation targets a single item or a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Item,
    Collection,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Item => "item",
            OperationType::Collection => "collection",
        }
    }
}

/// Generate the route name of `operation` on the resource `short_name`.
///
/// ```
/// use waypost_core::routing::{route_name, OperationType};
///
/// assert_eq!(
///     route_name("accept", "ProductReview", OperationType::Item),
///     "api_product_reviews_accept_item"
/// );
/// ```
pub fn route_name(operation: &str, short_name: &str, operation_type: OperationType) -> String {
    format!(
        "{}{}_{}_{}",
        ROUTE_NAME_PREFIX,
        pluralize(&tableize(short_name)),
        operation,
        operation_type.as_str()
    )
}

/// `ProductReview` -> `product_review`
pub fn tableize(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 4);
    let mut previous: Option<char> = None;
    for c in word.chars() {
        if c.is_uppercase() && previous.is_some_and(|p| p.is_alphanumeric() || p == '_') {
            out.push('_');
        }
        out.extend(c.to_lowercase());
        previous = Some(c);
    }
    out
}

/// English plural of a lower-case word, covering the regular suffixes.
pub fn pluralize(word: &str) -> String {
    const SIBILANTS: [&str; 5] = ["s", "x", "z", "ch", "sh"];

    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{}ies", stem);
        }
    }
    if SIBILANTS.iter().any(|suffix| word.ends_with(suffix)) {
        return format!("{}es", word);
    }
    format!("{}s", word)
}

/// Bytes escaped inside one path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode `value` for use as a single path segment.
///
/// ```
/// use waypost_core::routing::encode_path_segment;
///
/// assert_eq!(encode_path_segment("A/B 1?x"), "A%2FB%201%3Fx");
/// ```
pub fn encode_path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Generates URLs for named routes.
pub trait UrlGenerator: Send + Sync {
    /// Build the URL of `route`, filling placeholders from `params`.
    ///
    /// Parameters not consumed by the path are appended as a query string.
    fn generate(&self, route: &str, params: &[(&str, &str)]) -> Result<String, RoutingError>;
}

impl<U: UrlGenerator + ?Sized> UrlGenerator for std::sync::Arc<U> {
    fn generate(&self, route: &str, params: &[(&str, &str)]) -> Result<String, RoutingError> {
        (**self).generate(route, params)
    }
}

/// A named route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    /// Upper-cased HTTP method
    pub method: String,
    /// Path template (e.g. `/new-api/payments/{id}/complete`)
    pub path: String,
}

impl Route {
    pub fn new(name: impl Into<String>, method: impl AsRef<str>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method: method.as_ref().to_ascii_uppercase(),
            path: path.into(),
        }
    }
}

/// Result of matching a request path against the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: String,
    pub params: Vec<(String, String)>,
}

/// Named routes with URL generation and method-aware path matching.
#[derive(Default)]
pub struct RouteCollection {
    routes: HashMap<String, Route>,
    matchers: HashMap<String, matchit::Router<String>>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route. Names must be unique, and two routes with the same
    /// method must not match the same paths.
    pub fn add(&mut self, route: Route) -> Result<(), RoutingError> {
        if self.routes.contains_key(&route.name) {
            return Err(RoutingError::DuplicateRoute(route.name));
        }
        validate_template(&route)?;

        self.matchers
            .entry(route.method.clone())
            .or_default()
            .insert(route.path.clone(), route.name.clone())
            .map_err(|e| RoutingError::Conflict {
                route: route.name.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(route = %route.name, method = %route.method, path = %route.path, "Route registered");
        self.routes.insert(route.name.clone(), route);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the route serving `method` + `path`. Parameters are percent-decoded.
    pub fn match_path(&self, method: &str, path: &str) -> Option<RouteMatch> {
        let matcher = self.matchers.get(&method.to_ascii_uppercase())?;
        let matched = matcher.at(path).ok()?;
        Some(RouteMatch {
            route: matched.value.clone(),
            params: matched
                .params
                .iter()
                .map(|(k, v)| {
                    let value = percent_decode_str(v).decode_utf8_lossy();
                    (k.to_string(), value.into_owned())
                })
                .collect(),
        })
    }
}

impl std::fmt::Debug for RouteCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteCollection")
            .field("route_count", &self.routes.len())
            .finish()
    }
}

impl UrlGenerator for RouteCollection {
    fn generate(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RoutingError> {
        let route = self
            .routes
            .get(name)
            .ok_or_else(|| RoutingError::RouteNotFound(name.to_string()))?;

        let mut url = String::with_capacity(route.path.len());
        let mut rest = route.path.as_str();
        let mut used = Vec::new();

        while let Some(open) = rest.find('{') {
            url.push_str(&rest[..open]);
            let close = rest[open..]
                .find('}')
                .map(|i| open + i)
                .ok_or_else(|| malformed(route))?;
            let param = rest[open + 1..close].trim_start_matches('*');
            let value = params
                .iter()
                .find(|(key, _)| *key == param)
                .map(|(_, value)| *value)
                .ok_or_else(|| RoutingError::MissingParameter {
                    route: route.name.clone(),
                    parameter: param.to_string(),
                })?;
            url.push_str(&encode_path_segment(value));
            used.push(param);
            rest = &rest[close + 1..];
        }
        url.push_str(rest);

        let extra: Vec<(&str, &str)> = params
            .iter()
            .filter(|(key, _)| !used.contains(key))
            .copied()
            .collect();
        if !extra.is_empty() {
            let query = serde_urlencoded::to_string(&extra).map_err(|e| RoutingError::Query {
                route: route.name.clone(),
                reason: e.to_string(),
            })?;
            url.push('?');
            url.push_str(&query);
        }

        Ok(url)
    }
}

fn malformed(route: &Route) -> RoutingError {
    RoutingError::MalformedPath {
        route: route.name.clone(),
        path: route.path.clone(),
    }
}

/// Every `{` must close before the next one opens, and names are non-empty.
fn validate_template(route: &Route) -> Result<(), RoutingError> {
    let mut rest = route.path.as_str();
    while let Some(open) = rest.find('{') {
        let close = rest[open..].find('}').ok_or_else(|| malformed(route))? + open;
        let name = rest[open + 1..close].trim_start_matches('*');
        if name.is_empty() || name.contains('{') {
            return Err(malformed(route));
        }
        rest = &rest[close + 1..];
    }
    if rest.contains('}') {
        return Err(malformed(route));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes() -> RouteCollection {
        let mut routes = RouteCollection::new();
        routes
            .add(Route::new("api_payments_get_item", "GET", "/new-api/payments/{id}"))
            .unwrap();
        routes
            .add(Route::new(
                "api_payments_complete_item",
                "PATCH",
                "/new-api/payments/{id}/complete",
            ))
            .unwrap();
        routes
    }

    #[test]
    fn test_inflection() {
        assert_eq!(tableize("ProductReview"), "product_review");
        assert_eq!(tableize("Payment"), "payment");
        assert_eq!(tableize("order"), "order");
        assert_eq!(pluralize("payment"), "payments");
        assert_eq!(pluralize("product_review"), "product_reviews");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("tax_category"), "tax_categories");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("box"), "boxes");
    }

    #[test]
    fn test_route_name() {
        assert_eq!(
            route_name("complete", "Payment", OperationType::Item),
            "api_payments_complete_item"
        );
        assert_eq!(
            route_name("get", "ProductReview", OperationType::Collection),
            "api_product_reviews_get_collection"
        );
    }

    #[test]
    fn test_generate_substitutes_placeholders() {
        let routes = routes();

        let url = routes
            .generate("api_payments_complete_item", &[("id", "42")])
            .unwrap();
        assert_eq!(url, "/new-api/payments/42/complete");
    }

    #[test]
    fn test_generated_segments_are_encoded_and_match_back() {
        let routes = routes();

        let url = routes
            .generate("api_payments_complete_item", &[("id", "A/B 1?x")])
            .unwrap();
        assert_eq!(url, "/new-api/payments/A%2FB%201%3Fx/complete");

        let matched = routes.match_path("PATCH", &url).unwrap();
        assert_eq!(matched.route, "api_payments_complete_item");
        assert_eq!(matched.params, vec![("id".to_string(), "A/B 1?x".to_string())]);
    }

    #[test]
    fn test_generate_appends_unused_params_as_query() {
        let routes = routes();

        let url = routes
            .generate("api_payments_get_item", &[("id", "7"), ("locale", "en US")])
            .unwrap();
        assert_eq!(url, "/new-api/payments/7?locale=en+US");
    }

    #[test]
    fn test_generate_errors() {
        let routes = routes();

        assert_eq!(
            routes.generate("api_orders_get_item", &[("id", "1")]),
            Err(RoutingError::RouteNotFound("api_orders_get_item".into()))
        );
        assert_eq!(
            routes.generate("api_payments_get_item", &[]),
            Err(RoutingError::MissingParameter {
                route: "api_payments_get_item".into(),
                parameter: "id".into(),
            })
        );
    }

    #[test]
    fn test_match_path() {
        let routes = routes();

        let matched = routes.match_path("patch", "/new-api/payments/42/complete").unwrap();
        assert_eq!(matched.route, "api_payments_complete_item");
        assert_eq!(matched.params, vec![("id".to_string(), "42".to_string())]);

        assert!(routes.match_path("GET", "/new-api/payments/42/complete").is_none());
        assert!(routes.match_path("DELETE", "/new-api/payments/42").is_none());
    }

    #[test]
    fn test_add_rejects_duplicates_and_malformed_paths() {
        let mut routes = routes();

        let err = routes
            .add(Route::new("api_payments_get_item", "GET", "/other/{id}"))
            .unwrap_err();
        assert_eq!(err, RoutingError::DuplicateRoute("api_payments_get_item".into()));

        let err = routes
            .add(Route::new("broken", "GET", "/payments/{id"))
            .unwrap_err();
        assert!(matches!(err, RoutingError::MalformedPath { .. }));

        let err = routes
            .add(Route::new("shadow", "GET", "/new-api/payments/{id}"))
            .unwrap_err();
        assert!(matches!(err, RoutingError::Conflict { .. }));
        assert_eq!(routes.len(), 2);
    }
}
