//! Store error types.

/// Errors from the key-value projection.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Transport-level failure against the backing storage (I/O, corrupt
    /// snapshot, poisoned lock). Fatal to the enclosing operation.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// The requested key is absent. Expected sometimes; returned to the
    /// caller rather than logged as an error.
    #[error("not found: {key}")]
    NotFound { key: String },
}

impl StoreError {
    pub(crate) fn unavailable(message: impl ToString) -> Self {
        StoreError::Unavailable {
            message: message.to_string(),
        }
    }

    pub(crate) fn not_found(key: impl Into<String>) -> Self {
        StoreError::NotFound { key: key.into() }
    }

    /// True for the expected-absent case, as opposed to a transport failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
