//! Exchange logging with full request and response bodies.

use std::{
    future::Future,
    net::SocketAddr,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    response::Response,
};
use bytes::{Bytes, BytesMut};
use http::{Method, StatusCode};
use http_body::{Frame, SizeHint};
use http_body_util::BodyExt;
use tower::{Layer, Service, ServiceExt};

use super::status_response;

/// Layer that logs one `info` event per exchange.
///
/// The request body is read up front; the inner service receives an
/// identical copy. The response body is recorded while it streams to the
/// client, unchanged. The event carries path, method, remote address, time
/// spent, raw query, request body, status and response body, and is emitted
/// when the response body has been fully sent or dropped.
///
/// If the request body cannot be read the inner service is not called and the
/// client gets `503 Service Unavailable`.
///
/// The remote address comes from [`ConnectInfo<SocketAddr>`], so serve the
/// router with `into_make_service_with_connect_info::<SocketAddr>()` to get
/// it. Without it the address is logged as `-`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerLayer {
    _priv: (),
}

impl LoggerLayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S> Layer<S> for LoggerLayer {
    type Service = LoggerService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggerService { inner }
    }
}

/// Service produced by [`LoggerLayer`].
#[derive(Debug, Clone)]
pub struct LoggerService<S> {
    inner: S,
}

impl<S> Service<Request> for LoggerService<S>
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
        let start = Instant::now();
        let uri = req.uri().path().to_owned();
        let query = req.uri().query().unwrap_or_default().to_owned();
        let method = req.method().clone();
        let ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_else(|| "-".to_owned());

        let inner = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, inner);

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let (resp, body) = match body.collect().await {
                Ok(collected) => {
                    let body = collected.to_bytes();
                    let req = Request::from_parts(parts, Body::from(body.clone()));
                    (inner.oneshot(req).await?, body)
                }
                Err(err) => {
                    tracing::error!(uri = %uri, error = %err, "read body error");
                    (status_response(StatusCode::SERVICE_UNAVAILABLE), Bytes::new())
                }
            };

            let exchange = Exchange {
                start,
                uri,
                method,
                ip,
                query,
                body,
                status: resp.status(),
            };
            let (parts, inner_body) = resp.into_parts();
            let recording = RecordingBody {
                inner: inner_body,
                render: BytesMut::new(),
                exchange: Some(exchange),
            };
            Ok(Response::from_parts(parts, Body::new(recording)))
        })
    }
}

struct Exchange {
    start: Instant,
    uri: String,
    method: Method,
    ip: String,
    query: String,
    body: Bytes,
    status: StatusCode,
}

/// Response body that keeps a copy of every data frame it forwards.
struct RecordingBody {
    inner: Body,
    render: BytesMut,
    exchange: Option<Exchange>,
}

impl RecordingBody {
    fn finish(&mut self) {
        let Some(exchange) = self.exchange.take() else {
            return;
        };
        let body = String::from_utf8_lossy(&exchange.body);
        let render = String::from_utf8_lossy(&self.render);
        tracing::info!(
            uri = %exchange.uri,
            method = %exchange.method,
            ip = %exchange.ip,
            spent = ?exchange.start.elapsed(),
            query = %exchange.query,
            body = %body,
            status = exchange.status.as_u16(),
            render = %render.trim_end_matches('\n'),
            "request served"
        );
    }
}

impl http_body::Body for RecordingBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, axum::Error>>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.render.extend_from_slice(data);
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            other => other,
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for RecordingBody {
    fn drop(&mut self) {
        self.finish();
    }
}
