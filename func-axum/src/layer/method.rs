use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use axum::{extract::Request, response::Response};
use http::{Method, StatusCode};
use tower::{Layer, Service, ServiceExt};

use super::status_response;

/// Layer that only lets through one request method.
///
/// Anything else gets `405 Method Not Allowed`. `HEAD` is not treated as
/// `GET`.
#[derive(Debug, Clone)]
pub struct MethodLayer {
    method: Method,
}

impl MethodLayer {
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl<S> Layer<S> for MethodLayer {
    type Service = MethodService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MethodService {
            inner,
            method: self.method.clone(),
        }
    }
}

/// Service produced by [`MethodLayer`].
#[derive(Debug, Clone)]
pub struct MethodService<S> {
    inner: S,
    method: Method,
}

impl<S> Service<Request> for MethodService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Error: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        if *req.method() != self.method {
            tracing::warn!(uri = %req.uri().path(), method = %req.method(), "method not allowed");
            return Box::pin(async { Ok(status_response(StatusCode::METHOD_NOT_ALLOWED)) });
        }

        let inner = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, inner);

        Box::pin(async move { inner.oneshot(req).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::capture_logs;
    use axum::body::Body;
    use std::convert::Infallible;
    use tower::ServiceBuilder;

    async fn reached(_req: Request) -> Result<Response, Infallible> {
        Ok(Response::new(Body::empty()))
    }

    async fn status_for(method: Method) -> StatusCode {
        let svc = ServiceBuilder::new()
            .layer(MethodLayer::new(Method::GET))
            .service_fn(reached);
        let req = Request::builder()
            .method(method)
            .uri("/func")
            .body(Body::empty())
            .unwrap();
        svc.oneshot(req).await.unwrap().status()
    }

    #[tokio::test]
    async fn configured_method_passes() {
        assert_eq!(status_for(Method::GET).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn other_methods_are_rejected() {
        assert_eq!(status_for(Method::HEAD).await, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(status_for(Method::POST).await, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn rejection_is_logged() {
        let (logs, _guard) = capture_logs();
        status_for(Method::DELETE).await;
        let out = logs.contents();
        assert!(out.contains("WARN"), "{out}");
        assert!(out.contains("method=DELETE"), "{out}");
    }
}
