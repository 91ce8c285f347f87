//! # Provider: Transitions that are both legal and exposed
//!
//! A transition is offered to API clients only when the object's state
//! machine allows it from the current state *and* the API declares an item
//! operation with the same name.

use crate::metadata::ResourceMetadata;
use std::sync::Arc;
use tracing::debug;
use waypost_flow::{GraphRegistry, StateMachineFactory, Stateful};

/// Computes the API transitions available to an object.
pub trait ApiTransitionsProvider: Send + Sync {
    /// Names of the transitions in `exposed` that the object's state
    /// machine allows from its current state.
    ///
    /// Output order follows `exposed`; the result is always a subset of it.
    fn resolve_possible_transitions(&self, object: &dyn Stateful, exposed: &[&str]) -> Vec<String>;

    /// Same as `resolve_possible_transitions`, using the item operations of
    /// `metadata` as the exposed set.
    fn possible_api_transitions(
        &self,
        object: &dyn Stateful,
        metadata: &ResourceMetadata,
    ) -> Vec<String> {
        let exposed: Vec<&str> = metadata.item_operation_names().collect();
        self.resolve_possible_transitions(object, &exposed)
    }
}

impl<P: ApiTransitionsProvider + ?Sized> ApiTransitionsProvider for Arc<P> {
    fn resolve_possible_transitions(&self, object: &dyn Stateful, exposed: &[&str]) -> Vec<String> {
        (**self).resolve_possible_transitions(object, exposed)
    }
}

/// Resolves transitions through the registered state machine graphs.
///
/// Missing graphs and binding failures are configuration misses, not
/// errors: the object simply has no transitions.
#[derive(Clone)]
pub struct StateMachineTransitionsProvider {
    factory: Arc<dyn StateMachineFactory>,
    graphs: Arc<GraphRegistry>,
}

impl StateMachineTransitionsProvider {
    /// Use `graphs` to pick a graph per class and `factory` to bind it.
    pub fn new(factory: Arc<dyn StateMachineFactory>, graphs: Arc<GraphRegistry>) -> Self {
        Self { factory, graphs }
    }

    /// Use the registry both for graph lookup and for binding.
    pub fn from_registry(graphs: Arc<GraphRegistry>) -> Self {
        Self {
            factory: graphs.clone(),
            graphs,
        }
    }
}

impl ApiTransitionsProvider for StateMachineTransitionsProvider {
    fn resolve_possible_transitions(&self, object: &dyn Stateful, exposed: &[&str]) -> Vec<String> {
        let class = object.resource_class();
        let Some(config) = self.graphs.for_class(class) else {
            debug!(class, "No state machine graph configured");
            return Vec::new();
        };

        let machine = match self.factory.get(object, &config.graph) {
            Ok(machine) => machine,
            Err(error) => {
                debug!(class, graph = %config.graph, %error, "State machine unavailable, exposing no transitions");
                return Vec::new();
            }
        };

        let possible = machine.possible_transitions();
        let mut resolved: Vec<String> = Vec::new();
        for name in exposed {
            if possible.contains(name) && !resolved.iter().any(|r| r == name) {
                resolved.push((*name).to_string());
            }
        }

        debug!(
            class,
            graph = %config.graph,
            state = machine.current_state(),
            ?resolved,
            "Resolved API transitions"
        );
        resolved
    }
}
