//! Adapting endpoint functions into axum handlers.
//!
//! An endpoint function takes one parameter record and returns either a
//! result record or an error:
//!
//! ```rust
//! use axum::{Router, routing::any};
//! use func_axum::{EndpointError, Params, func};
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
//! let app: Router = Router::new().route("/func", any(func(hello)));
//! # let _ = app;
//! ```
//!
//! Functions of any other shape do not satisfy [`Endpoint`] and are rejected
//! when the route is built. Two parameters:
//!
//! ```compile_fail
//! use func_axum::{EndpointError, Params, func};
//!
//! #[derive(Default, serde::Deserialize, Params)]
//! struct Param;
//!
//! fn two(_: Param, _: Param) -> Result<(), EndpointError> {
//!     Ok(())
//! }
//!
//! let _ = func(two);
//! ```
//!
//! A single output with no error slot:
//!
//! ```compile_fail
//! use func_axum::{Params, func};
//!
//! #[derive(Default, serde::Deserialize, Params)]
//! struct Param;
//!
//! fn only_error(_: Param) -> Option<String> {
//!     None
//! }
//!
//! let _ = func(only_error);
//! ```
//!
//! A parameter that is not a record:
//!
//! ```compile_fail
//! use func_axum::{EndpointError, func};
//!
//! fn by_number(_: i64) -> Result<(), EndpointError> {
//!     Ok(())
//! }
//!
//! let _ = func(by_number);
//! ```

use std::{future::Future, marker::PhantomData, pin::Pin, sync::Arc};

use axum::{
    extract::Request,
    handler::Handler,
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use serde::Serialize;

use func_axum_core::Errno;

use crate::bind::bind;
use crate::config::BindConfig;
use crate::error::EndpointError;
use crate::params::{Field, Params};
use crate::response::{render_err, render_ok};
use crate::signature::{SignatureError, validate};

/// A function that can be served as an endpoint.
///
/// Implemented for every `Fn(P) -> Result<R, E>` where the result serializes
/// and the error converts into [`EndpointError`].
pub trait Endpoint<P>: Clone + Send + Sync + 'static {
    type Output: Serialize;
    type Error: Into<EndpointError>;

    fn call(&self, params: P) -> Result<Self::Output, Self::Error>;
}

impl<F, P, R, E> Endpoint<P> for F
where
    F: Fn(P) -> Result<R, E> + Clone + Send + Sync + 'static,
    R: Serialize,
    E: Into<EndpointError>,
{
    type Output = R;
    type Error = E;

    fn call(&self, params: P) -> Result<R, E> {
        self(params)
    }
}

/// An endpoint function adapted into an axum [`Handler`].
///
/// Per request: bind a zero-valued `P`, call the endpoint once, render the
/// envelope. Binding failures answer with [`Errno::PARAM`] and never reach
/// the endpoint.
pub struct Func<F, P> {
    endpoint: F,
    fields: Arc<[Field<P>]>,
    config: BindConfig,
    _params: PhantomData<fn() -> P>,
}

impl<F: Clone, P> Clone for Func<F, P> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            fields: Arc::clone(&self.fields),
            config: self.config,
            _params: PhantomData,
        }
    }
}

impl<F, P> Func<F, P>
where
    F: Endpoint<P>,
    P: Params,
{
    /// Adapt `endpoint`, validating its parameter record.
    pub fn try_new(endpoint: F) -> Result<Self, SignatureError> {
        let fields = P::fields();
        validate(&fields)?;
        Ok(Self {
            endpoint,
            fields: fields.into(),
            config: BindConfig::default(),
            _params: PhantomData,
        })
    }

    /// Adapt `endpoint`.
    ///
    /// # Panics
    ///
    /// Panics if the parameter record's descriptor table is invalid. This is
    /// meant to run while the router is built, before anything is served.
    #[track_caller]
    pub fn new(endpoint: F) -> Self {
        match Self::try_new(endpoint) {
            Ok(func) => func,
            Err(err) => panic!("invalid endpoint: {err}"),
        }
    }

    pub fn with_config(mut self, config: BindConfig) -> Self {
        self.config = config;
        self
    }

    /// The cached descriptor table of `P`.
    pub fn fields(&self) -> &[Field<P>] {
        &self.fields
    }

    /// Handle one request.
    pub async fn serve(&self, req: Request) -> Response {
        let params = match bind(&self.fields, req, &self.config).await {
            Ok(params) => params,
            Err(err) => {
                tracing::debug!(error = %err, "parameter binding failed");
                return render_err(Errno::PARAM, &err.to_string());
            }
        };

        match self.endpoint.call(params) {
            Ok(output) => render_ok(&output),
            Err(err) => {
                let err: EndpointError = err.into();
                tracing::debug!(errno = %err.errno(), error = %err, "endpoint returned an error");
                err.into_response()
            }
        }
    }
}

impl<F, P, S> Handler<(P,), S> for Func<F, P>
where
    F: Endpoint<P>,
    P: Params,
    S: Clone + Send + Sync + 'static,
{
    type Future = Pin<Box<dyn Future<Output = Response> + Send>>;

    fn call(self, req: Request, _state: S) -> Self::Future {
        Box::pin(async move { self.serve(req).await })
    }
}

/// Adapt an endpoint function. See [`Func::new`].
#[track_caller]
pub fn func<F, P>(endpoint: F) -> Func<F, P>
where
    F: Endpoint<P>,
    P: Params,
{
    Func::new(endpoint)
}

/// Creates a GET method router from an endpoint function.
#[track_caller]
pub fn get_func<F, P, S>(endpoint: F) -> MethodRouter<S>
where
    F: Endpoint<P>,
    P: Params,
    S: Clone + Send + Sync + 'static,
{
    axum::routing::get(Func::new(endpoint))
}

/// Creates a POST method router from an endpoint function.
#[track_caller]
pub fn post_func<F, P, S>(endpoint: F) -> MethodRouter<S>
where
    F: Endpoint<P>,
    P: Params,
    S: Clone + Send + Sync + 'static,
{
    axum::routing::post(Func::new(endpoint))
}
