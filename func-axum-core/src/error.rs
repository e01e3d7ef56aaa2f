//! Error numbers and envelope encoding errors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Application error number carried in the `errno` field of every envelope.
///
/// `0` means success. The library itself only ever produces [`Errno::PARAM`]
/// and [`Errno::INTERNAL`]; any other value comes from an endpoint that
/// returned a coded error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Errno(pub i64);

impl Errno {
    /// The call succeeded.
    pub const OK: Errno = Errno(0);
    /// The request parameters could not be bound into the parameter record.
    pub const PARAM: Errno = Errno(1);
    /// The endpoint failed without supplying its own error number.
    pub const INTERNAL: Errno = Errno(2);

    /// Returns the raw number.
    pub fn get(self) -> i64 {
        self.0
    }

    /// Returns whether this number signals success.
    pub fn is_ok(self) -> bool {
        self == Errno::OK
    }
}

impl From<i64> for Errno {
    fn from(value: i64) -> Self {
        Errno(value)
    }
}

impl From<i32> for Errno {
    fn from(value: i32) -> Self {
        Errno(i64::from(value))
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Failure while turning a result record into envelope bytes.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The result record could not be serialized to JSON.
    #[error("failed to encode response data: {0}")]
    Data(#[source] serde_json::Error),
    /// The envelope itself could not be serialized.
    #[error("failed to encode response envelope: {0}")]
    Envelope(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_numbers() {
        assert_eq!(Errno::OK.get(), 0);
        assert_eq!(Errno::PARAM.get(), 1);
        assert_eq!(Errno::INTERNAL.get(), 2);
        assert!(Errno::OK.is_ok());
        assert!(!Errno::PARAM.is_ok());
    }

    #[test]
    fn serializes_as_bare_integer() {
        assert_eq!(serde_json::to_string(&Errno(1042)).unwrap(), "1042");
        let parsed: Errno = serde_json::from_str("-7").unwrap();
        assert_eq!(parsed, Errno(-7));
    }
}
