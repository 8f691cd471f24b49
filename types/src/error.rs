//! Top-level error type shared across crates.

use thiserror::Error;

/// Errors raised while constructing the fundamental types.
#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid account id: {0}")]
    InvalidAccountId(String),

    #[error("invalid fraction: {0}")]
    InvalidFraction(String),
}
