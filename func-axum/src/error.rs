//! Errors returned by endpoint functions.

use axum::response::{IntoResponse, Response};

use crate::bind::BindError;
use crate::response::render_err;

// Re-export core types
pub use func_axum_core::{EnvelopeError, Errno};

/// The error half of an endpoint's result.
///
/// Endpoints pick a variant explicitly: [`EndpointError::coded`] when the
/// caller should see a specific error number, [`EndpointError::plain`] (or
/// any of the `From` conversions) when the generic [`Errno::INTERNAL`] will do.
///
/// Endpoint crates with their own error enums implement
/// `From<TheirError> for EndpointError` and return `Result<_, TheirError>`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    /// An error carrying its own error number.
    #[error("{message}")]
    Coded { errno: Errno, message: String },
    /// An error without a number; reported as [`Errno::INTERNAL`].
    #[error("{message}")]
    Plain { message: String },
}

impl EndpointError {
    pub fn coded<N: Into<Errno>, S: Into<String>>(errno: N, message: S) -> Self {
        Self::Coded {
            errno: errno.into(),
            message: message.into(),
        }
    }

    pub fn plain<S: Into<String>>(message: S) -> Self {
        Self::Plain {
            message: message.into(),
        }
    }

    /// The number written to the envelope.
    pub fn errno(&self) -> Errno {
        match self {
            Self::Coded { errno, .. } => *errno,
            Self::Plain { .. } => Errno::INTERNAL,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Coded { message, .. } | Self::Plain { message } => message,
        }
    }
}

impl From<String> for EndpointError {
    fn from(message: String) -> Self {
        Self::plain(message)
    }
}

impl From<&str> for EndpointError {
    fn from(message: &str) -> Self {
        Self::plain(message)
    }
}

impl From<std::io::Error> for EndpointError {
    fn from(err: std::io::Error) -> Self {
        Self::plain(err.to_string())
    }
}

impl From<anyhow::Error> for EndpointError {
    fn from(err: anyhow::Error) -> Self {
        Self::plain(format!("{err:#}"))
    }
}

impl From<BindError> for EndpointError {
    fn from(err: BindError) -> Self {
        Self::coded(Errno::PARAM, err.to_string())
    }
}

impl IntoResponse for EndpointError {
    fn into_response(self) -> Response {
        render_err(self.errno(), self.message())
    }
}
