//! Registration-time validation of endpoint signatures.
//!
//! The shape of an endpoint function (one parameter record in, a result or an
//! error out) is enforced by the compiler through [`Endpoint`](crate::Endpoint).
//! What the type system cannot see is the descriptor table of the parameter
//! record, which may be written by hand. It is checked here, once, when the
//! endpoint is adapted, so a broken record stops the service from starting
//! instead of failing on some later request.

use std::collections::HashMap;

use crate::params::{Field, Params};

/// A parameter record whose descriptor table cannot be bound.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("parameter record `{record}`: field `{field}` has an empty source key")]
    EmptyKey {
        record: &'static str,
        field: &'static str,
    },
    #[error(
        "parameter record `{record}`: fields `{first}` and `{second}` both read source key `{key}`"
    )]
    DuplicateKey {
        record: &'static str,
        key: &'static str,
        first: &'static str,
        second: &'static str,
    },
}

/// Check the descriptor table of `P`.
pub fn validate<P: Params>(fields: &[Field<P>]) -> Result<(), SignatureError> {
    let record = std::any::type_name::<P>();
    let mut seen: HashMap<&'static str, &'static str> = HashMap::with_capacity(fields.len());

    for field in fields {
        if field.key().is_empty() {
            return Err(SignatureError::EmptyKey {
                record,
                field: field.name(),
            });
        }
        if let Some(first) = seen.insert(field.key(), field.name()) {
            return Err(SignatureError::DuplicateKey {
                record,
                key: field.key(),
                first,
                second: field.name(),
            });
        }
    }
    Ok(())
}
