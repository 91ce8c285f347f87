//! Waypost Flow - State Machine Graph Layer
//!
//! This crate defines the **structural** aspects of Waypost workflows:
//! - `Stateful`: Read access to an object's class tag and state properties
//! - `GraphDefinition`: A named set of states and transitions for one class
//! - `GraphRegistry`: The read-only list of graphs known to the process
//! - `StateMachine`: A graph bound to one object
//!
//! **IMPORTANT**: This layer is Pure Rust - no HTTP, no IO, no Async.

pub mod error;
pub mod factory;
pub mod graph;
pub mod machine;
pub mod state;
pub mod transition;

pub use error::FlowError;
pub use factory::StateMachineFactory;
pub use graph::{GraphDefinition, GraphRegistry, DEFAULT_PROPERTY_PATH};
pub use machine::StateMachine;
pub use state::Stateful;
pub use transition::TransitionDef;

pub mod prelude {
    pub use crate::error::FlowError;
    pub use crate::factory::StateMachineFactory;
    pub use crate::graph::{GraphDefinition, GraphRegistry};
    pub use crate::machine::StateMachine;
    pub use crate::state::Stateful;
    pub use crate::transition::TransitionDef;
}
