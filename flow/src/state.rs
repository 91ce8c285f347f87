//! Stateful - Read access to workflow-driven objects
//!
//! The flow layer never owns domain objects. It only needs two things from
//! them: the class tag used to pick a graph, and the value of the property
//! holding the current state.
//!
//! # Example
//! ```rust
//! use waypost_flow::Stateful;
//!
//! struct Payment {
//!     state: String,
//! }
//!
//! impl Stateful for Payment {
//!     fn resource_class(&self) -> &str {
//!         "Payment"
//!     }
//!
//!     fn state(&self, property_path: &str) -> Option<&str> {
//!         match property_path {
//!             "state" => Some(&self.state),
//!             _ => None,
//!         }
//!     }
//! }
//! ```

/// An object whose lifecycle is driven by a state machine graph.
pub trait Stateful {
    /// Exact class tag of the object. Graphs are matched on equality, so
    /// subtypes must report their own tag.
    fn resource_class(&self) -> &str;

    /// Current value of the state property at `property_path`.
    ///
    /// Returns `None` when the object has no such property.
    fn state(&self, property_path: &str) -> Option<&str>;
}

impl<T: Stateful + ?Sized> Stateful for &T {
    fn resource_class(&self) -> &str {
        (**self).resource_class()
    }

    fn state(&self, property_path: &str) -> Option<&str> {
        (**self).state(property_path)
    }
}

impl<T: Stateful + ?Sized> Stateful for Box<T> {
    fn resource_class(&self) -> &str {
        (**self).resource_class()
    }

    fn state(&self, property_path: &str) -> Option<&str> {
        (**self).state(property_path)
    }
}
