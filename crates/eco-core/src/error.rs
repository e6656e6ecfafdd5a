//! Engine error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.  Per-agent tick logic never produces errors; these
//! exist for configuration mistakes caught while building a run.

use thiserror::Error;

/// The base error type shared by all `eco-*` crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `eco-core`.
pub type CoreResult<T> = Result<T, CoreError>;
