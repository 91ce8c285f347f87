//! Waypost facade crate.
//!
//! This crate re-exports the flow, core and http crates with a single entry point.
//! `Waypost::from_path()` loads the configuration and assembles the pipeline;
//! it does not serve requests.

pub mod api;
pub mod telemetry;

pub use waypost_core as core;
pub use waypost_flow as flow;
#[cfg(feature = "http")]
pub use waypost_http as http;

pub use api::Waypost;
pub use waypost_core::{
    ApiResource, ConfigError, SerializerError, StateMachineTransitionsNormalizer, WaypostConfig,
};
#[cfg(feature = "http")]
pub use waypost_http::{ApiRequest, ApiRequestFactory};

pub mod prelude {
    pub use crate::api::Waypost;
    pub use waypost_core::prelude::*;
    #[cfg(feature = "http")]
    pub use waypost_http::prelude::*;
}
