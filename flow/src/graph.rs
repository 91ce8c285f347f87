//! GraphDefinition - Named state machine graphs
//!
//! A graph belongs to exactly one class tag. The registry keeps graphs in
//! declaration order; when two graphs target the same class, the first one
//! wins.

use crate::error::FlowError;
use crate::transition::TransitionDef;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Property read from objects when a graph does not name one.
pub const DEFAULT_PROPERTY_PATH: &str = "state";

fn default_property_path() -> String {
    DEFAULT_PROPERTY_PATH.to_string()
}

/// Static definition of the states and transitions available to one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDefinition {
    /// Class tag the graph applies to
    pub class: String,
    /// Graph name (e.g. `sylius_payment`)
    pub graph: String,
    /// Object property holding the current state
    #[serde(default = "default_property_path")]
    pub property_path: String,
    /// Declared states
    pub states: Vec<String>,
    /// Declared transitions, in declaration order
    #[serde(default)]
    pub transitions: Vec<TransitionDef>,
}

impl GraphDefinition {
    pub fn new(class: impl Into<String>, graph: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            graph: graph.into(),
            property_path: default_property_path(),
            states: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn with_property_path(mut self, property_path: impl Into<String>) -> Self {
        self.property_path = property_path.into();
        self
    }

    pub fn with_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    pub fn with_transition(mut self, transition: TransitionDef) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.states.iter().any(|s| s == state)
    }

    pub fn transition(&self, name: &str) -> Option<&TransitionDef> {
        self.transitions.iter().find(|t| t.name == name)
    }

    /// Check that every transition references declared states and that
    /// transition names are unique.
    pub fn validate(&self) -> Result<(), FlowError> {
        let mut seen = HashSet::new();
        for transition in &self.transitions {
            if !seen.insert(transition.name.as_str()) {
                return Err(FlowError::DuplicateTransition {
                    graph: self.graph.clone(),
                    transition: transition.name.clone(),
                });
            }

            let undeclared = transition
                .from
                .iter()
                .chain(std::iter::once(&transition.to))
                .find(|state| !self.has_state(state));

            if let Some(state) = undeclared {
                return Err(FlowError::UndeclaredState {
                    graph: self.graph.clone(),
                    transition: transition.name.clone(),
                    state: state.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Read-only collection of validated graphs.
///
/// Built once when the process starts and shared afterwards; there is no
/// way to add or remove graphs after construction.
#[derive(Debug, Clone, Default)]
pub struct GraphRegistry {
    graphs: Vec<GraphDefinition>,
}

impl GraphRegistry {
    /// Validate and register `graphs`, keeping their order.
    pub fn new(graphs: Vec<GraphDefinition>) -> Result<Self, FlowError> {
        let mut names = HashSet::new();
        for graph in &graphs {
            if !names.insert(graph.graph.as_str()) {
                return Err(FlowError::DuplicateGraph(graph.graph.clone()));
            }
            graph.validate()?;
        }
        Ok(Self { graphs })
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self::default()
    }

    /// First graph registered for `class`, in declaration order.
    pub fn for_class(&self, class: &str) -> Option<&GraphDefinition> {
        self.graphs.iter().find(|g| g.class == class)
    }

    /// Graph registered under `name`.
    pub fn graph(&self, name: &str) -> Option<&GraphDefinition> {
        self.graphs.iter().find(|g| g.graph == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GraphDefinition> {
        self.graphs.iter()
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

/// Payment graph used across the crate's tests.
#[cfg(test)]
pub(crate) fn payment_graph() -> GraphDefinition {
    GraphDefinition::new("Payment", "sylius_payment")
        .with_states([
            "cart",
            "new",
            "processing",
            "authorized",
            "completed",
            "failed",
            "cancelled",
            "refunded",
        ])
        .with_transition(TransitionDef::new("create", ["cart"], "new"))
        .with_transition(TransitionDef::new("process", ["new"], "processing"))
        .with_transition(TransitionDef::new(
            "authorize",
            ["new", "processing"],
            "authorized",
        ))
        .with_transition(TransitionDef::new(
            "complete",
            ["new", "processing", "authorized"],
            "completed",
        ))
        .with_transition(TransitionDef::new("fail", ["new", "processing"], "failed"))
        .with_transition(TransitionDef::new(
            "cancel",
            ["new", "processing", "authorized"],
            "cancelled",
        ))
        .with_transition(TransitionDef::new("refund", ["completed"], "refunded"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup_by_class_and_name() {
        let registry = GraphRegistry::new(vec![payment_graph()]).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.for_class("Payment").unwrap().graph, "sylius_payment");
        assert!(registry.graph("sylius_payment").is_some());
        assert!(registry.for_class("Order").is_none());
        assert!(registry.graph("sylius_order").is_none());
    }

    #[test]
    fn test_first_graph_wins_for_duplicate_class() {
        let first = GraphDefinition::new("Review", "review_moderation").with_states(["new"]);
        let second = GraphDefinition::new("Review", "review_archive").with_states(["new"]);
        let registry = GraphRegistry::new(vec![first, second]).unwrap();

        assert_eq!(registry.for_class("Review").unwrap().graph, "review_moderation");
    }

    #[test]
    fn test_rejects_undeclared_state() {
        let graph = GraphDefinition::new("Review", "sylius_review")
            .with_states(["new", "accepted"])
            .with_transition(TransitionDef::new("reject", ["new"], "rejected"));

        let err = GraphRegistry::new(vec![graph]).unwrap_err();
        assert_eq!(
            err,
            FlowError::UndeclaredState {
                graph: "sylius_review".into(),
                transition: "reject".into(),
                state: "rejected".into(),
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_transition_and_graph() {
        let graph = GraphDefinition::new("Review", "sylius_review")
            .with_states(["new", "accepted"])
            .with_transition(TransitionDef::new("accept", ["new"], "accepted"))
            .with_transition(TransitionDef::new("accept", ["new"], "accepted"));
        assert!(matches!(
            graph.validate(),
            Err(FlowError::DuplicateTransition { .. })
        ));

        let err = GraphRegistry::new(vec![payment_graph(), payment_graph()]).unwrap_err();
        assert_eq!(err, FlowError::DuplicateGraph("sylius_payment".into()));
    }

    #[test]
    fn test_property_path_defaults_to_state() {
        let json = r#"{"class":"Review","graph":"sylius_review","states":["new"]}"#;
        let graph: GraphDefinition = serde_json::from_str(json).unwrap();

        assert_eq!(graph.property_path, DEFAULT_PROPERTY_PATH);
        assert!(graph.transitions.is_empty());
    }
}
