//! Panic recovery.

use std::{
    any::Any,
    backtrace::Backtrace,
    cell::RefCell,
    future::Future,
    panic::{self, AssertUnwindSafe},
    pin::Pin,
    sync::Once,
    task::{Context, Poll},
};

use axum::{extract::Request, response::Response};
use futures::FutureExt;
use http::StatusCode;
use tower::{Layer, Service, ServiceExt};

use super::status_response;

static INSTALL_HOOK: Once = Once::new();

thread_local! {
    static LAST_BACKTRACE: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

/// Record a backtrace for every panic, on the panicking thread, then defer to
/// whatever hook was installed before.
fn install_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            LAST_BACKTRACE.with(|slot| {
                *slot.borrow_mut() = Some(Backtrace::force_capture());
            });
            previous(info);
        }));
    });
}

fn take_backtrace() -> String {
    LAST_BACKTRACE
        .with(|slot| slot.borrow_mut().take())
        .map(|bt| bt.to_string())
        .unwrap_or_else(|| "<no backtrace captured>".to_owned())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "Box<dyn Any>"
    }
}

/// Layer that catches panics raised while the inner service handles a
/// request.
///
/// The panic is logged at `error` level with the request path and a
/// backtrace, and the client gets `500 Internal Server Error`. The process and
/// the connection keep going.
///
/// Building the first `RecoveryLayer` installs a process-wide panic hook that
/// records backtraces. The previously installed hook still runs.
#[derive(Debug, Clone, Copy)]
pub struct RecoveryLayer {
    _priv: (),
}

impl Default for RecoveryLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecoveryLayer {
    pub fn new() -> Self {
        install_hook();
        Self { _priv: () }
    }
}

impl<S> Layer<S> for RecoveryLayer {
    type Service = RecoveryService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RecoveryService { inner }
    }
}

/// Service produced by [`RecoveryLayer`].
#[derive(Debug, Clone)]
pub struct RecoveryService<S> {
    inner: S,
}

impl<S> Service<Request> for RecoveryService<S>
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
        let uri = req.uri().path().to_owned();

        let inner = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, inner);

        Box::pin(async move {
            match AssertUnwindSafe(inner.oneshot(req)).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => {
                    let stack = take_backtrace();
                    tracing::error!(
                        uri = %uri,
                        panic = panic_message(payload.as_ref()),
                        stack = %stack,
                        "recovered from panic"
                    );
                    Ok(status_response(StatusCode::INTERNAL_SERVER_ERROR))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::capture_logs;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use std::convert::Infallible;
    use tower::ServiceBuilder;

    async fn explode(req: Request) -> Result<Response, Infallible> {
        if req.uri().path() == "/boom" {
            panic!("kaboom");
        }
        Ok(Response::new(Body::from("fine")))
    }

    fn request(path: &str) -> Request {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn passes_through_without_panic() {
        let svc = ServiceBuilder::new()
            .layer(RecoveryLayer::new())
            .service_fn(explode);
        let resp = svc.oneshot(request("/ok")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"fine");
    }

    #[tokio::test]
    async fn panic_becomes_500_and_is_logged() {
        let (logs, _guard) = capture_logs();
        let svc = ServiceBuilder::new()
            .layer(RecoveryLayer::new())
            .service_fn(explode);

        let resp = svc.clone().oneshot(request("/boom")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Internal Server Error");

        let out = logs.contents();
        assert!(out.contains("recovered from panic"), "{out}");
        assert!(out.contains("uri=/boom"), "{out}");
        assert!(out.contains("kaboom"), "{out}");
        assert!(out.contains("stack="), "{out}");
        assert!(!out.contains("<no backtrace captured>"), "{out}");

        let resp = svc.oneshot(request("/ok")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn hook_records_backtrace_for_the_panicking_thread() {
        let _layer = RecoveryLayer::new();
        let _ = take_backtrace();
        let caught = panic::catch_unwind(|| panic!("recorded"));
        assert!(caught.is_err());
        let stack = take_backtrace();
        assert_ne!(stack, "<no backtrace captured>");
        assert!(!stack.is_empty());
        assert_eq!(take_backtrace(), "<no backtrace captured>");
    }

    #[test]
    fn panic_payloads() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");
        let s: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(s.as_ref()), "owned");
        let s: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(s.as_ref()), "Box<dyn Any>");
    }
}
