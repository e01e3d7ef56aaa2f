//! Rendering envelopes as HTTP responses.
//!
//! Every envelope is sent with `200 OK` and `application/json`; success or
//! failure is carried by `errno`, not by the HTTP status.

use axum::response::{IntoResponse, Response};
use http::{HeaderValue, header};
use serde::Serialize;

use func_axum_core::{Errno, encode_failure, encode_success};

use crate::error::EndpointError;

const APPLICATION_JSON: &str = "application/json";

fn envelope_response(body: Vec<u8>) -> Response {
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))],
        body,
    )
        .into_response()
}

/// Render a success envelope around `data`.
///
/// If `data` cannot be serialized, an [`Errno::INTERNAL`] failure is rendered
/// instead.
pub fn render_ok<T: Serialize + ?Sized>(data: &T) -> Response {
    match encode_success(data) {
        Ok(body) => envelope_response(body),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode response data");
            render_err(Errno::INTERNAL, &err.to_string())
        }
    }
}

/// Render a failure envelope.
pub fn render_err(errno: Errno, errmsg: &str) -> Response {
    envelope_response(encode_failure(errno, errmsg))
}

/// Handler return type that renders as an envelope.
///
/// For hand-written axum handlers that want the same wire format as adapted
/// endpoints:
///
/// ```rust
/// use func_axum::{Bind, Errno, Params, Reply};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Deserialize, Params)]
/// #[serde(default)]
/// struct Query {
///     #[form = "who"]
///     who: String,
/// }
///
/// #[derive(Serialize)]
/// struct Greeting {
///     greeting: String,
/// }
///
/// async fn hello(Bind(q): Bind<Query>) -> Reply<Greeting> {
///     if q.who.is_empty() {
///         return Reply::err(Errno(1001), "who is required");
///     }
///     Reply::ok(Greeting {
///         greeting: format!("Hello, {}", q.who),
///     })
/// }
/// # let _ = axum::Router::<()>::new().route("/", axum::routing::get(hello));
/// ```
#[derive(Debug, Clone)]
pub struct Reply<T>(pub Result<T, EndpointError>);

impl<T> Reply<T> {
    pub fn ok(data: T) -> Self {
        Self(Ok(data))
    }

    pub fn err<N: Into<Errno>, S: Into<String>>(errno: N, errmsg: S) -> Self {
        Self(Err(EndpointError::coded(errno, errmsg)))
    }

    pub fn into_inner(self) -> Result<T, EndpointError> {
        self.0
    }
}

impl<T, E> From<Result<T, E>> for Reply<T>
where
    E: Into<EndpointError>,
{
    fn from(result: Result<T, E>) -> Self {
        Self(result.map_err(Into::into))
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        match self.0 {
            Ok(data) => render_ok(&data),
            Err(err) => err.into_response(),
        }
    }
}
