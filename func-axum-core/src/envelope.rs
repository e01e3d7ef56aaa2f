//! The uniform response envelope.
//!
//! Every adapted endpoint answers with the same JSON object:
//!
//! ```json
//! {"errno": 0, "errmsg": "", "data": {"greeting": "hi"}}
//! {"errno": 1, "errmsg": "field 'a' should be an integer"}
//! ```
//!
//! `data` is only present on success, and only when the result serializes to
//! something other than `null`. Encoded envelopes end with a newline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EnvelopeError, Errno};

/// Body written when a failure envelope cannot be serialized.
pub const FALLBACK_FAILURE: &[u8] = b"{\"errno\":2,\"errmsg\":\"internal error\"}\n";

/// The `{errno, errmsg, data}` response envelope.
///
/// `T` defaults to [`serde_json::Value`], which is what the encoders produce.
/// Clients can decode straight into their own result type instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub errno: Errno,
    pub errmsg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// A success envelope carrying `data`.
    pub fn ok(data: Option<T>) -> Self {
        Self {
            errno: Errno::OK,
            errmsg: String::new(),
            data,
        }
    }

    /// A failure envelope. Failures never carry data.
    pub fn err<M: Into<String>>(errno: Errno, errmsg: M) -> Self {
        Self {
            errno,
            errmsg: errmsg.into(),
            data: None,
        }
    }

    /// Whether this envelope reports success.
    pub fn is_ok(&self) -> bool {
        self.errno.is_ok()
    }
}

impl<T: Serialize> Envelope<T> {
    /// Serialize the envelope, newline terminated.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EnvelopeError> {
        let mut buf = serde_json::to_vec(self).map_err(EnvelopeError::Envelope)?;
        buf.push(b'\n');
        Ok(buf)
    }
}

/// Encode a success envelope around `data`.
///
/// A result that serializes to `null` (for example `()` or `None`) is treated
/// as absent and the `data` key is omitted.
pub fn encode_success<T: Serialize + ?Sized>(data: &T) -> Result<Vec<u8>, EnvelopeError> {
    let value = serde_json::to_value(data).map_err(EnvelopeError::Data)?;
    let data = if value.is_null() { None } else { Some(value) };
    Envelope::ok(data).to_bytes()
}

/// Encode a failure envelope.
pub fn encode_failure(errno: Errno, errmsg: &str) -> Vec<u8> {
    Envelope::<Value>::err(errno, errmsg)
        .to_bytes()
        .unwrap_or_else(|_| FALLBACK_FAILURE.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Greeting {
        greeting: String,
    }

    fn parse(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn success_carries_data() {
        let bytes = encode_success(&Greeting {
            greeting: "Hello, eachain".into(),
        })
        .unwrap();
        assert_eq!(
            parse(&bytes),
            json!({"errno": 0, "errmsg": "", "data": {"greeting": "Hello, eachain"}})
        );
        assert_eq!(bytes.last(), Some(&b'\n'));
    }

    #[test]
    fn success_without_result_omits_data() {
        let bytes = encode_success(&()).unwrap();
        let value = parse(&bytes);
        assert_eq!(value, json!({"errno": 0, "errmsg": ""}));
        assert!(value.get("data").is_none());

        let bytes = encode_success(&Option::<Greeting>::None).unwrap();
        assert!(parse(&bytes).get("data").is_none());
    }

    #[test]
    fn failure_never_carries_data() {
        let bytes = encode_failure(Errno::INTERNAL, "boom");
        let value = parse(&bytes);
        assert_eq!(value, json!({"errno": 2, "errmsg": "boom"}));
        assert!(value.get("data").is_none());
    }

    #[test]
    fn unserializable_data_is_reported() {
        use std::collections::HashMap;
        // JSON object keys must be strings
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);
        let err = encode_success(&map).unwrap_err();
        assert!(matches!(err, EnvelopeError::Data(_)));
    }

    #[test]
    fn decodes_into_typed_data() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Out {
            n: i64,
        }
        let env: Envelope<Out> =
            serde_json::from_str(r#"{"errno":0,"errmsg":"","data":{"n":3}}"#).unwrap();
        assert_eq!(env.data, Some(Out { n: 3 }));

        let env: Envelope<Out> = serde_json::from_str(r#"{"errno":1042,"errmsg":"nope"}"#).unwrap();
        assert!(!env.is_ok());
        assert_eq!(env.data, None);
    }
}
