//! Example: plain functions served through the adapter and middleware.
//!
//! Run with: cargo run -p func-axum-examples
//!
//! Test with:
//!   curl 'http://localhost:3000/hello?who=eachain'
//!   curl 'http://localhost:3000/order?sku=tea&qty=3&at=1512979871&tags=green,loose'
//!   curl -X POST -H 'content-type: application/json' \
//!        -d '{"sku":"tea","qty":2}' \
//!        http://localhost:3000/order
//!   curl 'http://localhost:3000/panic'

use std::net::SocketAddr;

use axum::{
    Router,
    routing::{any, get},
};
use chrono::{DateTime, Utc};
use func_axum::prelude::*;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Deserialize, Params)]
#[serde(default)]
struct HelloRequest {
    #[form = "who"]
    who: String,
}

#[derive(Debug, Serialize)]
struct HelloResponse {
    greeting: String,
}

fn hello(req: HelloRequest) -> Result<HelloResponse, EndpointError> {
    let who = if req.who.is_empty() { "World" } else { &req.who };
    Ok(HelloResponse {
        greeting: format!("Hello, {who}"),
    })
}

#[derive(Debug, Default, Deserialize, Params)]
#[serde(default)]
struct OrderRequest {
    sku: String,
    qty: i32,
    at: DateTime<Utc>,
    tags: Vec<String>,
}

#[derive(Debug, Serialize)]
struct OrderResponse {
    sku: String,
    qty: i32,
    at: DateTime<Utc>,
    tags: Vec<String>,
}

#[derive(Debug)]
enum OrderError {
    EmptyOrder,
    UnknownSku(String),
}

impl From<OrderError> for EndpointError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::EmptyOrder => EndpointError::coded(1001, "quantity must be positive"),
            OrderError::UnknownSku(sku) => EndpointError::coded(1002, format!("unknown sku {sku}")),
        }
    }
}

fn order(req: OrderRequest) -> Result<OrderResponse, OrderError> {
    if req.qty <= 0 {
        return Err(OrderError::EmptyOrder);
    }
    if req.sku != "tea" && req.sku != "coffee" {
        return Err(OrderError::UnknownSku(req.sku));
    }
    Ok(OrderResponse {
        sku: req.sku,
        qty: req.qty,
        at: req.at,
        tags: req.tags,
    })
}

#[derive(Debug, Default, Deserialize, Params)]
struct Empty;

fn explode(_: Empty) -> Result<(), EndpointError> {
    panic!("this endpoint always panics");
}

/// Hand-written handler using the extractor and reply types.
async fn echo(Bind(req): Bind<HelloRequest>) -> Reply<HelloResponse> {
    if req.who.is_empty() {
        return Reply::err(Errno::PARAM, "who is required");
    }
    Reply::ok(HelloResponse { greeting: req.who })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let app = Router::new()
        .route("/hello", any(func(hello)))
        .route("/order", any(Func::try_new(order)?))
        .route("/panic", get_func(explode))
        .route("/echo", get(echo))
        .layer(
            ServiceBuilder::new()
                .layer(LoggerLayer::new())
                .layer(RecoveryLayer::new()),
        );

    let addr: SocketAddr = "0.0.0.0:3000".parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
