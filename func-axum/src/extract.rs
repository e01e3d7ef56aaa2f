//! The [`Bind`] extractor, for handlers written as ordinary axum functions.

use std::fmt;

use axum::{
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};

use func_axum_core::Errno;

use crate::bind::{BindError, bind};
use crate::config::BindConfig;
use crate::params::Params;
use crate::response::render_err;

/// Extracts a parameter record the same way [`Func`](crate::Func) does.
///
/// The body limit comes from a [`BindConfig`] request extension when one is
/// present, else the default.
///
/// ```rust
/// use axum::{Router, routing::post};
/// use func_axum::{Bind, Params, Reply};
///
/// #[derive(Default, serde::Deserialize, Params)]
/// #[serde(default)]
/// struct Order {
///     #[form = "sku"]
///     sku: String,
///     #[form = "qty"]
///     qty: i32,
/// }
///
/// async fn place(Bind(order): Bind<Order>) -> Reply<String> {
///     Reply::ok(format!("{} x{}", order.sku, order.qty))
/// }
///
/// let app: Router = Router::new().route("/order", post(place));
/// # let _ = app;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Bind<P>(pub P);

impl<S, P> FromRequest<S> for Bind<P>
where
    S: Send + Sync,
    P: Params,
{
    type Rejection = BindRejection;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let config = req
            .extensions()
            .get::<BindConfig>()
            .copied()
            .unwrap_or_default();
        let fields = P::fields();
        bind(&fields, req, &config)
            .await
            .map(Bind)
            .map_err(BindRejection)
    }
}

/// Rejection for [`Bind`]: a parameter failure envelope.
#[derive(Debug)]
pub struct BindRejection(pub BindError);

impl fmt::Display for BindRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for BindRejection {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<BindError> for BindRejection {
    fn from(err: BindError) -> Self {
        Self(err)
    }
}

impl IntoResponse for BindRejection {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self.0, "parameter binding failed");
        render_err(Errno::PARAM, &self.0.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Reply;
    use axum::{Extension, Router, body::Body, routing::any};
    use http::{Method, header};
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    #[derive(Debug, Default, Deserialize, crate::Params)]
    #[serde(default)]
    struct Order {
        #[form = "sku"]
        sku: String,
        #[form = "qty"]
        qty: i32,
    }

    async fn place(Bind(order): Bind<Order>) -> Reply<String> {
        Reply::ok(format!("{} x{}", order.sku, order.qty))
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn extracts_from_form_body() {
        let app = Router::new().route("/order", any(place));
        let req = Request::builder()
            .method(Method::POST)
            .uri("/order")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("sku=tea&qty=3"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(
            body_json(resp).await,
            json!({"errno": 0, "errmsg": "", "data": "tea x3"})
        );
    }

    #[tokio::test]
    async fn rejection_is_param_envelope() {
        let app = Router::new().route("/order", any(place));
        let req = Request::builder()
            .uri("/order?sku=tea&qty=lots")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            json!({"errno": 1, "errmsg": "field 'qty' should be an integer"})
        );
    }

    #[tokio::test]
    async fn config_extension_limits_body() {
        let app = Router::new()
            .route("/order", any(place))
            .layer(Extension(BindConfig::new().max_body_bytes(4)));
        let req = Request::builder()
            .method(Method::POST)
            .uri("/order")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"sku":"tea","qty":3}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["errno"], 1);
        assert!(body.get("data").is_none());
    }
}
