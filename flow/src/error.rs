use thiserror::Error;

/// Failures raised while validating graphs or binding them to objects.
///
/// Callers that only need "which transitions are available" treat every
/// variant as "none"; callers applying a transition should surface it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("no state machine graph named `{0}` is registered")]
    UnknownGraph(String),

    #[error("graph `{graph}` is registered for `{expected}`, got an object of class `{actual}`")]
    ClassMismatch {
        graph: String,
        expected: String,
        actual: String,
    },

    #[error("object of class `{class}` has no state at `{property_path}`")]
    MissingState {
        class: String,
        property_path: String,
    },

    #[error("state `{state}` is not declared in graph `{graph}`")]
    UnknownState { graph: String, state: String },

    #[error("transition `{transition}` is not declared in graph `{graph}`")]
    UnknownTransition { graph: String, transition: String },

    #[error("transition `{transition}` of graph `{graph}` references undeclared state `{state}`")]
    UndeclaredState {
        graph: String,
        transition: String,
        state: String,
    },

    #[error("transition `{transition}` is declared twice in graph `{graph}`")]
    DuplicateTransition { graph: String, transition: String },

    #[error("graph `{0}` is declared twice")]
    DuplicateGraph(String),
}
