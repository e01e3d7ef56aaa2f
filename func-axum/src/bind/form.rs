//! Form and query value sources.

use axum::{
    body::Body,
    extract::{FromRequest, Multipart, Request},
};
use http::{HeaderMap, Method, header};
use http_body_util::Limited;

use super::{BindError, read_body};
use crate::config::BindConfig;

const URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

/// Ordered key/value pairs collected from a request.
///
/// Body values come before query values, so a key present in both resolves
/// to the body's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pairs: Vec<(String, String)>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `application/x-www-form-urlencoded` data, also used for query strings.
    pub fn parse_urlencoded(input: &[u8]) -> Result<Self, BindError> {
        let pairs = serde_urlencoded::from_bytes(input).map_err(BindError::Form)?;
        Ok(Self { pairs })
    }

    pub fn push<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value for `key`, or `""` when absent.
    pub fn get(&self, key: &str) -> &str {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Collect the values of a request.
    ///
    /// The query string is always read. The body is read only for `POST`,
    /// `PUT` and `PATCH` requests carrying urlencoded or multipart data;
    /// multipart file parts are skipped.
    pub async fn from_request(req: Request, config: &BindConfig) -> Result<Self, BindError> {
        let query = match req.uri().query() {
            Some(query) => Self::parse_urlencoded(query.as_bytes())?,
            None => Self::new(),
        };

        let mut values = if reads_body(req.method()) {
            match media_type(req.headers()).as_str() {
                URLENCODED => {
                    let body = read_body(req.into_body(), config).await?;
                    Self::parse_urlencoded(&body)?
                }
                MULTIPART => Self::from_multipart(req, config).await?,
                _ => Self::new(),
            }
        } else {
            Self::new()
        };

        values.pairs.extend(query.pairs);
        Ok(values)
    }

    async fn from_multipart(req: Request, config: &BindConfig) -> Result<Self, BindError> {
        let (parts, body) = req.into_parts();
        let body = Body::new(Limited::new(body, config.get_max_body_bytes()));
        let req = Request::from_parts(parts, body);

        let mut multipart = Multipart::from_request(req, &())
            .await
            .map_err(|err| BindError::Multipart(err.to_string()))?;

        let mut values = Self::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| BindError::Multipart(err.to_string()))?
        {
            if field.file_name().is_some() {
                continue;
            }
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            let text = field
                .text()
                .await
                .map_err(|err| BindError::Multipart(err.to_string()))?;
            values.push(name, text);
        }
        Ok(values)
    }
}

fn reads_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

/// Lowercased media type without parameters.
fn media_type(headers: &HeaderMap) -> String {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, uri: &str, content_type: &str, body: impl Into<Body>) -> Request {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(body.into())
            .unwrap()
    }

    #[test]
    fn first_value_wins_and_missing_is_empty() {
        let values = FormValues::parse_urlencoded(b"a=1&a=2&b=x%20y").unwrap();
        assert_eq!(values.get("a"), "1");
        assert_eq!(values.get("b"), "x y");
        assert_eq!(values.get("missing"), "");
        assert_eq!(values.len(), 3);
    }

    #[tokio::test]
    async fn get_ignores_body() {
        let req = request(Method::GET, "/?a=query", URLENCODED, "a=body");
        let values = FormValues::from_request(req, &BindConfig::default()).await.unwrap();
        assert_eq!(values.get("a"), "query");
        assert_eq!(values.len(), 1);
    }

    #[tokio::test]
    async fn delete_with_form_type_reads_query_only() {
        let req = request(Method::DELETE, "/?id=9", URLENCODED, "id=1");
        let values = FormValues::from_request(req, &BindConfig::default()).await.unwrap();
        assert_eq!(values.get("id"), "9");
    }

    #[tokio::test]
    async fn media_type_is_case_insensitive() {
        let req = request(
            Method::PATCH,
            "/",
            "Application/X-WWW-Form-Urlencoded; charset=UTF-8",
            "k=v",
        );
        let values = FormValues::from_request(req, &BindConfig::default()).await.unwrap();
        assert_eq!(values.get("k"), "v");
    }

    #[tokio::test]
    async fn multipart_text_parts_are_values() {
        let body = concat!(
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"who\"\r\n",
            "\r\n",
            "eachain\r\n",
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"upload\"; filename=\"a.txt\"\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "file contents\r\n",
            "--XBOUNDARY--\r\n",
        );
        let req = request(
            Method::POST,
            "/?who=query&page=2",
            "multipart/form-data; boundary=XBOUNDARY",
            body,
        );
        let values = FormValues::from_request(req, &BindConfig::default()).await.unwrap();
        assert_eq!(values.get("who"), "eachain");
        assert_eq!(values.get("page"), "2");
        assert_eq!(values.get("upload"), "");
    }

    #[tokio::test]
    async fn malformed_multipart_is_an_error() {
        let req = request(Method::POST, "/", "multipart/form-data", "garbage");
        let err = FormValues::from_request(req, &BindConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BindError::Multipart(_)));
    }
}
