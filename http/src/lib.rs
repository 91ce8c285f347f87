//! Waypost HTTP - API client requests
//!
//! Builds `http::Request<Bytes>` values for the resource API: item and
//! collection reads, writes, and state machine transitions sent as
//! `PATCH {prefix}/{resource}/{id}/{transition}`.
//! No client or server is bundled; hand the request to any HTTP stack.

pub mod request;

pub use request::{ApiRequest, ApiRequestFactory, RequestError, merge_values};

pub mod prelude {
    pub use crate::request::{ApiRequest, ApiRequestFactory, RequestError};
}
