//! StateMachineFactory - Binding graphs to objects by name
//!
//! The factory is the seam callers mock when they want to exercise binding
//! failures without crafting broken graphs.

use crate::error::FlowError;
use crate::graph::GraphRegistry;
use crate::machine::StateMachine;
use crate::state::Stateful;

/// Produces state machines bound to an object and a named graph.
pub trait StateMachineFactory: Send + Sync {
    /// Bind the graph registered under `graph` to `object`.
    fn get<'a>(
        &'a self,
        object: &'a dyn Stateful,
        graph: &str,
    ) -> Result<StateMachine<'a>, FlowError>;
}

impl StateMachineFactory for GraphRegistry {
    fn get<'a>(
        &'a self,
        object: &'a dyn Stateful,
        graph: &str,
    ) -> Result<StateMachine<'a>, FlowError> {
        let definition = self
            .graph(graph)
            .ok_or_else(|| FlowError::UnknownGraph(graph.to_string()))?;
        StateMachine::bind(object, definition)
    }
}

impl<F: StateMachineFactory + ?Sized> StateMachineFactory for std::sync::Arc<F> {
    fn get<'a>(
        &'a self,
        object: &'a dyn Stateful,
        graph: &str,
    ) -> Result<StateMachine<'a>, FlowError> {
        (**self).get(object, graph)
    }
}
