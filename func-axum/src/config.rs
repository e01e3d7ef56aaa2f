//! Binder configuration.

/// Default cap on request bodies read by the binder (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 << 20;

/// Limits applied while binding parameters.
///
/// Set once at startup. Attach it to an adapter with
/// [`Func::with_config`](crate::Func::with_config), or insert it as a request
/// extension to configure the [`Bind`](crate::Bind) extractor:
///
/// ```rust
/// use axum::{Extension, Router};
/// use func_axum::BindConfig;
///
/// let config = BindConfig::new().max_body_bytes(64 * 1024);
/// let app: Router = Router::new().layer(Extension(config));
/// # let _ = app;
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BindConfig {
    max_body_bytes: usize,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl BindConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the largest request body the binder will read.
    ///
    /// Bodies above the limit fail binding with a parameter error.
    pub fn max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    pub fn get_max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
}
