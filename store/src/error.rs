use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),

    /// The host's metering limit was hit. Must abort the whole transaction.
    #[error("resource limit exhausted: {0}")]
    ResourceExhausted(String),
}

impl StoreError {
    /// Whether this error must abort the enclosing transaction untouched.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ResourceExhausted(_))
    }
}
