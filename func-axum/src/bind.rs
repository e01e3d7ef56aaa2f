//! Binding request data into parameter records.
//!
//! The binding mode is chosen from the request:
//!
//! - `GET` and `HEAD` requests, and any request whose `Content-Type` contains
//!   `form`, are bound field by field from form and query values, driven by
//!   the record's descriptor table.
//! - Everything else is bound by decoding the whole body as JSON into the
//!   record. JSON binding uses the record's serde names and ignores the form
//!   source keys.

mod form;

pub use form::FormValues;

use axum::{body::Body, extract::Request};
use bytes::Bytes;
use chrono::DateTime;
use http::{HeaderMap, Method, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::BindConfig;
use crate::params::{Field, Params, Slot};

/// Why a request could not be bound into a parameter record.
///
/// Any error means the record must not be used.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("field '{key}' should be an integer")]
    Integer { key: &'static str },
    #[error("field '{key}' should be a float number")]
    Float { key: &'static str },
    #[error("field '{key}' should be a unix timestamp")]
    Timestamp { key: &'static str },
    #[error("unsupported field '{key}' type: {type_name}")]
    Unsupported {
        key: &'static str,
        type_name: &'static str,
    },
    #[error("{0}")]
    Json(#[source] serde_json::Error),
    #[error("invalid form data: {0}")]
    Form(#[source] serde_urlencoded::de::Error),
    #[error("invalid multipart form: {0}")]
    Multipart(String),
    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),
}

/// How a request's parameters are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    /// Per-field from query string and form body values.
    Form,
    /// Whole-body JSON decode.
    Json,
}

impl BindMode {
    /// Pick the mode for a request.
    pub fn detect(method: &Method, headers: &HeaderMap) -> Self {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        if is_bodyless(method) || content_type.contains("form") {
            BindMode::Form
        } else {
            BindMode::Json
        }
    }
}

fn is_bodyless(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

/// Bind `req` into a fresh `P` using the descriptor table `fields`.
pub async fn bind<P: Params>(
    fields: &[Field<P>],
    req: Request,
    config: &BindConfig,
) -> Result<P, BindError> {
    match BindMode::detect(req.method(), req.headers()) {
        BindMode::Form => {
            let values = FormValues::from_request(req, config).await?;
            bind_form(fields, &values)
        }
        BindMode::Json => {
            let body = read_body(req.into_body(), config).await?;
            bind_json(&body)
        }
    }
}

/// Fill a zero-valued `P` from form values.
///
/// Stops at the first field that fails.
pub fn bind_form<P: Params>(fields: &[Field<P>], values: &FormValues) -> Result<P, BindError> {
    let mut params = P::default();
    for field in fields {
        let key = field.key();
        let raw = values.get(key);
        match field.slot() {
            Slot::Int(set) => raw
                .parse::<i64>()
                .ok()
                .and_then(|value| set(&mut params, value))
                .ok_or(BindError::Integer { key })?,
            Slot::Float(set) => {
                let value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite() || spells_non_finite(raw))
                    .ok_or(BindError::Float { key })?;
                set(&mut params, value);
            }
            Slot::String(set) => set(&mut params, raw.to_owned()),
            Slot::Strings(set) => set(&mut params, split_list(raw)),
            Slot::Time(set) => {
                let value = raw
                    .parse::<i64>()
                    .ok()
                    .and_then(|secs| DateTime::from_timestamp(secs, 0))
                    .ok_or(BindError::Timestamp { key })?;
                set(&mut params, value);
            }
            Slot::Unsupported => {
                return Err(BindError::Unsupported {
                    key,
                    type_name: field.type_name(),
                });
            }
        }
    }
    Ok(params)
}

/// Overflowing numbers parse to infinity; only an explicit spelling may.
fn spells_non_finite(raw: &str) -> bool {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    ["inf", "infinity", "nan"]
        .iter()
        .any(|word| unsigned.eq_ignore_ascii_case(word))
}

/// Split a comma-separated value.
///
/// An empty value is an empty list, not a list holding one empty string.
pub fn split_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(str::to_owned).collect()
}

/// Decode the first JSON value in `body` into `P`.
///
/// Anything after the first value is ignored. Keys missing from the body keep
/// their zero value, which `#[derive(Params)]` guarantees by requiring
/// `#[serde(default)]` on the record.
pub fn bind_json<P: DeserializeOwned>(body: &[u8]) -> Result<P, BindError> {
    let mut de = serde_json::Deserializer::from_slice(body);
    P::deserialize(&mut de).map_err(BindError::Json)
}

pub(crate) async fn read_body(body: Body, config: &BindConfig) -> Result<Bytes, BindError> {
    axum::body::to_bytes(body, config.get_max_body_bytes())
        .await
        .map_err(BindError::Body)
}
