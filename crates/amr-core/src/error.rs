//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `AmrError` as one
//! variant via `#[from]`.

use thiserror::Error;

/// The top-level error type for `amr-core`.
#[derive(Debug, Error)]
pub enum AmrError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `amr-core`.
pub type AmrResult<T> = Result<T, AmrError>;
