//! TransitionDef - Declared edges of a state machine graph
//!
//! A transition is a named move from one of several source states to a
//! single target state.

use serde::{Deserialize, Serialize};

/// One named edge of a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDef {
    /// Transition name, unique within its graph (e.g. `complete`)
    pub name: String,
    /// States from which the transition may be applied
    pub from: Vec<String>,
    /// State the object ends up in
    pub to: String,
}

impl TransitionDef {
    pub fn new<I, S>(name: impl Into<String>, from: I, to: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            from: from.into_iter().map(Into::into).collect(),
            to: to.into(),
        }
    }

    /// Check whether the transition may leave `state`.
    pub fn applies_from(&self, state: &str) -> bool {
        self.from.iter().any(|from| from == state)
    }
}
