//! StateMachine - A graph bound to one object
//!
//! Binding checks the object against the graph once; afterwards every query
//! is a pure lookup over the graph's transition list.

use crate::error::FlowError;
use crate::graph::GraphDefinition;
use crate::state::Stateful;
use crate::transition::TransitionDef;

/// A `GraphDefinition` bound to an object's current state.
#[derive(Debug, Clone, Copy)]
pub struct StateMachine<'a> {
    graph: &'a GraphDefinition,
    state: &'a str,
}

impl<'a> StateMachine<'a> {
    /// Bind `graph` to `object`.
    ///
    /// Fails when the object belongs to another class, has no value at the
    /// graph's property path, or is in a state the graph does not declare.
    pub fn bind(object: &'a dyn Stateful, graph: &'a GraphDefinition) -> Result<Self, FlowError> {
        let class = object.resource_class();
        if class != graph.class {
            return Err(FlowError::ClassMismatch {
                graph: graph.graph.clone(),
                expected: graph.class.clone(),
                actual: class.to_string(),
            });
        }

        let state = object
            .state(&graph.property_path)
            .ok_or_else(|| FlowError::MissingState {
                class: class.to_string(),
                property_path: graph.property_path.clone(),
            })?;

        if !graph.has_state(state) {
            return Err(FlowError::UnknownState {
                graph: graph.graph.clone(),
                state: state.to_string(),
            });
        }

        Ok(Self { graph, state })
    }

    pub fn current_state(&self) -> &'a str {
        self.state
    }

    pub fn graph_name(&self) -> &'a str {
        &self.graph.graph
    }

    pub fn graph(&self) -> &'a GraphDefinition {
        self.graph
    }

    /// Check whether `transition` may be applied from the current state.
    pub fn can(&self, transition: &str) -> Result<bool, FlowError> {
        self.lookup(transition).map(|t| t.applies_from(self.state))
    }

    /// Names of every transition legal from the current state, in
    /// declaration order.
    pub fn possible_transitions(&self) -> Vec<&'a str> {
        self.graph
            .transitions
            .iter()
            .filter(|t| t.applies_from(self.state))
            .map(|t| t.name.as_str())
            .collect()
    }

    /// State reached by applying `transition`.
    pub fn target_of(&self, transition: &str) -> Result<&'a str, FlowError> {
        self.lookup(transition).map(|t| t.to.as_str())
    }

    fn lookup(&self, transition: &str) -> Result<&'a TransitionDef, FlowError> {
        self.graph
            .transition(transition)
            .ok_or_else(|| FlowError::UnknownTransition {
                graph: self.graph.graph.clone(),
                transition: transition.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::payment_graph;

    struct Payment {
        state: Option<String>,
    }

    impl Payment {
        fn in_state(state: &str) -> Self {
            Self {
                state: Some(state.to_string()),
            }
        }
    }

    impl Stateful for Payment {
        fn resource_class(&self) -> &str {
            "Payment"
        }

        fn state(&self, property_path: &str) -> Option<&str> {
            match property_path {
                "state" => self.state.as_deref(),
                _ => None,
            }
        }
    }

    struct Order;

    impl Stateful for Order {
        fn resource_class(&self) -> &str {
            "Order"
        }

        fn state(&self, _property_path: &str) -> Option<&str> {
            Some("new")
        }
    }

    #[test]
    fn test_possible_transitions_from_new() {
        let graph = payment_graph();
        let payment = Payment::in_state("new");
        let machine = StateMachine::bind(&payment, &graph).unwrap();

        assert_eq!(machine.current_state(), "new");
        assert_eq!(machine.graph_name(), "sylius_payment");
        assert_eq!(
            machine.possible_transitions(),
            vec!["process", "authorize", "complete", "fail", "cancel"]
        );
    }

    #[test]
    fn test_can_and_target_of() {
        let graph = payment_graph();
        let payment = Payment::in_state("completed");
        let machine = StateMachine::bind(&payment, &graph).unwrap();

        assert_eq!(machine.can("refund"), Ok(true));
        assert_eq!(machine.can("complete"), Ok(false));
        assert_eq!(machine.target_of("refund"), Ok("refunded"));
        assert!(matches!(
            machine.can("ship"),
            Err(FlowError::UnknownTransition { .. })
        ));
    }

    #[test]
    fn test_terminal_state_has_no_transitions() {
        let graph = payment_graph();
        let payment = Payment::in_state("refunded");
        let machine = StateMachine::bind(&payment, &graph).unwrap();

        assert!(machine.possible_transitions().is_empty());
    }

    #[test]
    fn test_bind_failures() {
        let graph = payment_graph();

        let err = StateMachine::bind(&Order, &graph).unwrap_err();
        assert!(matches!(err, FlowError::ClassMismatch { .. }));

        let stateless = Payment { state: None };
        let err = StateMachine::bind(&stateless, &graph).unwrap_err();
        assert!(matches!(err, FlowError::MissingState { .. }));

        let odd = Payment::in_state("shipped");
        let err = StateMachine::bind(&odd, &graph).unwrap_err();
        assert_eq!(
            err,
            FlowError::UnknownState {
                graph: "sylius_payment".into(),
                state: "shipped".into(),
            }
        );
    }
}
