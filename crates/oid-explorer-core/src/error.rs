//! Error taxonomy for lookup operations.
//!
//! Frontends map each variant to one outcome class: malformed input,
//! no matching data, or internal failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    /// A caller-supplied value failed a precondition. The store was not
    /// contacted.
    #[error("{0}")]
    InvalidInput(String),

    /// The query was well formed but matched nothing.
    #[error("{0}")]
    NotFound(String),

    /// The store failed to answer.
    #[error("{0:#}")]
    Store(#[from] anyhow::Error),
}

impl LookupError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}
