//! Errors shared by the score store backends.

use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by score stores regardless of the underlying backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Crediting would push the balance past the representable range.
    #[error("balance of `{participant}` would overflow")]
    Overflow {
        /// Participant whose balance was credited.
        participant: String,
    },
}
