use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{extract::Request, response::Response};
use http::{StatusCode, header};
use tower::{Layer, Service, ServiceExt};

use super::status_response;

/// Layer that only lets through requests addressed to one host.
///
/// The request host is the URI authority when the request line carries one,
/// else the `Host` header. Comparison is exact, port included. A request with
/// no host at all never matches. Mismatches get `400 Bad Request` and never
/// reach the inner service.
#[derive(Debug, Clone)]
pub struct HostLayer {
    host: Arc<str>,
}

impl HostLayer {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: Arc::from(host.into()),
        }
    }
}

impl<S> Layer<S> for HostLayer {
    type Service = HostService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HostService {
            inner,
            host: Arc::clone(&self.host),
        }
    }
}

/// Service produced by [`HostLayer`].
#[derive(Debug, Clone)]
pub struct HostService<S> {
    inner: S,
    host: Arc<str>,
}

pub(crate) fn request_host(req: &Request) -> &str {
    if let Some(authority) = req.uri().authority() {
        return authority.as_str();
    }
    req.headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

impl<S> Service<Request> for HostService<S>
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
        let host = request_host(&req);
        if host.is_empty() || host != &*self.host {
            tracing::warn!(uri = %req.uri().path(), host, "bad request: unexpected host");
            return Box::pin(async { Ok(status_response(StatusCode::BAD_REQUEST)) });
        }

        let inner = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, inner);

        Box::pin(async move { inner.oneshot(req).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use std::convert::Infallible;
    use tower::ServiceBuilder;

    async fn reached(_req: Request) -> Result<Response, Infallible> {
        Ok(Response::new(Body::from("reached")))
    }

    async fn status_and_body(svc_host: &str, req: Request) -> (StatusCode, String) {
        let svc = ServiceBuilder::new()
            .layer(HostLayer::new(svc_host))
            .service_fn(reached);
        let resp = svc.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn with_host_header(host: &str) -> Request {
        Request::builder()
            .uri("/func")
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn matching_host_header_passes() {
        let (status, body) = status_and_body("b.com", with_host_header("b.com")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "reached");
    }

    #[tokio::test]
    async fn matching_authority_passes() {
        let req = Request::builder()
            .uri("http://b.com/func")
            .body(Body::empty())
            .unwrap();
        let (status, _) = status_and_body("b.com", req).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn other_host_is_bad_request() {
        let (status, body) = status_and_body("b.com", with_host_header("a.com")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Bad Request");
    }

    #[tokio::test]
    async fn port_is_part_of_the_host() {
        let (status, _) = status_and_body("b.com", with_host_header("b.com:8080")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_host_is_bad_request() {
        let req = Request::builder().uri("/func").body(Body::empty()).unwrap();
        let (status, _) = status_and_body("b.com", req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = status_and_body("", with_host_header("")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
