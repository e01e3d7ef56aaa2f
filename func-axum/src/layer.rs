//! Tower middleware layers.
//!
//! Each layer wraps an inner service and yields a service of the same shape,
//! so they compose by nesting in any order the caller picks:
//!
//! - [`RecoveryLayer`]: turns a panicking inner service into a `500` response.
//! - [`HostLayer`]: only lets through requests for one host, else `400`.
//! - [`MethodLayer`]: only lets through one method, else `405`.
//! - [`LoggerLayer`]: logs every exchange with its full request and response
//!   bodies, without taking them away from the inner service or the client.
//!
//! ```rust
//! use axum::{Router, routing::any};
//! use func_axum::{EndpointError, HostLayer, LoggerLayer, MethodLayer, Params, RecoveryLayer, func};
//! use http::Method;
//! use tower::ServiceBuilder;
//!
//! #[derive(Default, serde::Deserialize, Params)]
//! struct Ping;
//!
//! fn ping(_: Ping) -> Result<&'static str, EndpointError> {
//!     Ok("pong")
//! }
//!
//! let app: Router = Router::new().route("/ping", any(func(ping))).layer(
//!     ServiceBuilder::new()
//!         .layer(LoggerLayer::new())
//!         .layer(RecoveryLayer::new())
//!         .layer(HostLayer::new("api.example.com"))
//!         .layer(MethodLayer::new(Method::GET)),
//! );
//! # let _ = app;
//! ```
//!
//! Rejections from these layers are plain-text status responses, not
//! envelopes.

mod host;
mod logger;
mod method;
mod recovery;

pub use host::{HostLayer, HostService};
pub use logger::{LoggerLayer, LoggerService};
pub use method::{MethodLayer, MethodService};
pub use recovery::{RecoveryLayer, RecoveryService};

use axum::response::{IntoResponse, Response};
use http::StatusCode;

/// A response carrying `status` and its reason phrase as the body.
pub(crate) fn status_response(status: StatusCode) -> Response {
    (status, status.canonical_reason().unwrap_or_default()).into_response()
}
