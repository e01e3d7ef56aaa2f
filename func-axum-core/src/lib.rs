//! Core wire types for func-axum.
//!
//! This crate holds the pieces of the protocol that do not depend on a
//! server framework, so clients can decode responses without pulling in axum.
//!
//! ## Modules
//!
//! - [`error`]: Error numbers carried in the `errno` field
//! - [`envelope`]: The `{errno, errmsg, data}` response envelope and its encoders

pub mod envelope;
pub mod error;

pub use envelope::*;
pub use error::*;
