//! Parameter records and their field-descriptor tables.
//!
//! A parameter record is a plain struct whose fields are filled from the
//! request before the endpoint runs. For form and query binding the binder
//! never looks at the struct itself; it walks the table returned by
//! [`Params::fields`], where every entry names a source key and knows how to
//! store one of the supported value kinds into its field.
//!
//! The table is normally produced by `#[derive(Params)]`:
//!
//! ```
//! use func_axum::{FieldKind, Params};
//! use serde::Deserialize;
//!
//! #[derive(Default, Deserialize, Params)]
//! #[serde(default)]
//! struct Search {
//!     #[form = "q"]
//!     query: String,
//!     #[form = "tags"]
//!     tags: Vec<String>,
//!     page: i64,
//! }
//!
//! let fields = Search::fields();
//! assert_eq!(fields[0].key(), "q");
//! assert_eq!(fields[1].kind(), FieldKind::Strings);
//! assert_eq!(fields[2].key(), "page");
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

/// A struct-like record that can be bound from a request.
///
/// `Default` provides the zero-valued record the binder starts from, and
/// `DeserializeOwned` is used when the request carries a JSON body.
pub trait Params: Default + DeserializeOwned + Send + 'static {
    /// Describe every field of the record.
    ///
    /// Called once when an endpoint is registered; the result is cached.
    fn fields() -> Vec<Field<Self>>;
}

/// Semantic kind of a parameter field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Signed integer, parsed base-10.
    Int,
    /// 64-bit float.
    Float,
    /// Raw string, empty when absent.
    String,
    /// Comma-separated list of strings.
    Strings,
    /// Instant encoded as Unix seconds.
    Time,
    /// Anything else. Form binding fails on these.
    Unsupported,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Int => "int",
            FieldKind::Float => "float",
            FieldKind::String => "string",
            FieldKind::Strings => "strings",
            FieldKind::Time => "time",
            FieldKind::Unsupported => "unsupported",
        }
    }
}

/// Setter for one field, typed by the value kind it accepts.
pub(crate) enum Slot<P> {
    /// Returns `None` when the value does not fit the field's integer type.
    Int(fn(&mut P, i64) -> Option<()>),
    Float(fn(&mut P, f64)),
    String(fn(&mut P, String)),
    Strings(fn(&mut P, Vec<String>)),
    Time(fn(&mut P, DateTime<Utc>)),
    Unsupported,
}

impl<P> Clone for Slot<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Slot<P> {}

/// Descriptor for one field of a parameter record.
pub struct Field<P> {
    name: &'static str,
    key: &'static str,
    type_name: &'static str,
    slot: Slot<P>,
}

impl<P> Field<P> {
    fn new(name: &'static str, key: &'static str, type_name: &'static str, slot: Slot<P>) -> Self {
        Self {
            name,
            key,
            type_name,
            slot,
        }
    }

    /// A signed integer field.
    pub fn int(
        name: &'static str,
        key: &'static str,
        type_name: &'static str,
        set: fn(&mut P, i64) -> Option<()>,
    ) -> Self {
        Self::new(name, key, type_name, Slot::Int(set))
    }

    /// A 64-bit float field.
    pub fn float(
        name: &'static str,
        key: &'static str,
        type_name: &'static str,
        set: fn(&mut P, f64),
    ) -> Self {
        Self::new(name, key, type_name, Slot::Float(set))
    }

    /// A string field.
    pub fn string(
        name: &'static str,
        key: &'static str,
        type_name: &'static str,
        set: fn(&mut P, String),
    ) -> Self {
        Self::new(name, key, type_name, Slot::String(set))
    }

    /// A comma-separated list of strings.
    pub fn strings(
        name: &'static str,
        key: &'static str,
        type_name: &'static str,
        set: fn(&mut P, Vec<String>),
    ) -> Self {
        Self::new(name, key, type_name, Slot::Strings(set))
    }

    /// An instant transmitted as Unix seconds.
    pub fn time(
        name: &'static str,
        key: &'static str,
        type_name: &'static str,
        set: fn(&mut P, DateTime<Utc>),
    ) -> Self {
        Self::new(name, key, type_name, Slot::Time(set))
    }

    /// A field whose type the form binder cannot fill.
    ///
    /// Such records still bind from JSON bodies.
    pub fn unsupported(name: &'static str, key: &'static str, type_name: &'static str) -> Self {
        Self::new(name, key, type_name, Slot::Unsupported)
    }

    /// Rust field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Wire name the value is read from.
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Declared type, as written in the record.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> FieldKind {
        match self.slot {
            Slot::Int(_) => FieldKind::Int,
            Slot::Float(_) => FieldKind::Float,
            Slot::String(_) => FieldKind::String,
            Slot::Strings(_) => FieldKind::Strings,
            Slot::Time(_) => FieldKind::Time,
            Slot::Unsupported => FieldKind::Unsupported,
        }
    }

    pub(crate) fn slot(&self) -> Slot<P> {
        self.slot
    }
}

impl<P> Clone for Field<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Field<P> {}

impl<P> fmt::Debug for Field<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("type_name", &self.type_name)
            .field("kind", &self.kind())
            .finish()
    }
}
