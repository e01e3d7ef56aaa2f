//! # func-axum
//!
//! Serve plain functions of shape `(params) -> Result<result, error>` as
//! [axum](https://github.com/tokio-rs/axum) handlers.
//!
//! The adapter binds the request into the parameter record, calls the
//! function once and writes a uniform JSON envelope:
//!
//! ```json
//! {"errno": 0, "errmsg": "", "data": {"greeting": "Hello, eachain"}}
//! ```
//!
//! A failure carries a non-zero `errno` and no `data`. Parameter binding
//! failures use [`Errno::PARAM`], errors without a code use
//! [`Errno::INTERNAL`], and [`EndpointError::coded`] carries any other
//! number through.
//!
//! ## Getting Started
//!
//! ```rust,no_run
//! use std::net::SocketAddr;
//!
//! use axum::{Router, routing::any};
//! use func_axum::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Deserialize, Params)]
//! #[serde(default)]
//! struct Param {
//!     #[form = "who"]
//!     who: String,
//! }
//!
//! #[derive(Serialize)]
//! struct Resp {
//!     greeting: String,
//! }
//!
//! fn hello(req: Param) -> Result<Resp, EndpointError> {
//!     Ok(Resp {
//!         greeting: format!("Hello, {}", req.who),
//!     })
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .route("/hello", any(func(hello)))
//!         .layer(RecoveryLayer::new())
//!         .layer(LoggerLayer::new());
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await.unwrap();
//!     axum::serve(
//!         listener,
//!         app.into_make_service_with_connect_info::<SocketAddr>(),
//!     )
//!     .await
//!     .unwrap();
//! }
//! ```
//!
//! ## Modules
//!
//! - [`params`]: The [`Params`](trait@Params) trait and field descriptors, derived with `#[derive(Params)]`
//! - [`signature`]: Registration-time checks of a parameter record
//! - [`bind`]: Form, query and JSON binding
//! - [`handler`]: The [`Func`] adapter
//! - [`extract`] / [`response`]: [`Bind`] and [`Reply`] for hand-written handlers
//! - [`layer`]: Recovery, host, method and logging middleware

extern crate self as func_axum;

pub mod bind;
pub mod config;
pub mod error;
pub mod extract;
pub mod handler;
pub mod layer;
pub mod params;
pub mod response;
pub mod signature;

#[cfg(test)]
pub(crate) mod test_util;

pub use func_axum_core::{Envelope, EnvelopeError, Errno, encode_failure, encode_success};
pub use func_axum_macros::Params;

pub use bind::{BindError, BindMode, FormValues, bind};
pub use config::{BindConfig, DEFAULT_MAX_BODY_BYTES};
pub use error::EndpointError;
pub use extract::{Bind, BindRejection};
pub use handler::{Endpoint, Func, func, get_func, post_func};
pub use layer::{
    HostLayer, HostService, LoggerLayer, LoggerService, MethodLayer, MethodService, RecoveryLayer,
    RecoveryService,
};
pub use params::{Field, FieldKind, Params};
pub use response::{Reply, render_err, render_ok};
pub use signature::{SignatureError, validate};

// Used by `#[derive(Params)]` output.
pub use chrono;
pub use serde;

pub mod prelude {
    //! The most common types, for glob import.
    pub use crate::error::EndpointError;
    pub use crate::extract::Bind;
    pub use crate::handler::{Func, func, get_func, post_func};
    pub use crate::layer::{HostLayer, LoggerLayer, MethodLayer, RecoveryLayer};
    pub use crate::Params;
    pub use crate::response::Reply;
    pub use func_axum_core::Errno;
}
