//! Error types shared across the engine.

use thiserror::Error;

use crate::{dao::storage::StorageError, state::session::SessionError};

/// Errors raised while reading the configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON for the expected shape.
    #[error("invalid config document")]
    Parse(#[from] serde_json::Error),
}

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The command is not valid for the current session state.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// No question provider could be built from the configuration.
    #[error("no question provider is enabled")]
    NoProvider,
    /// The score store could not be reached.
    #[error("score storage unavailable")]
    Storage(#[source] StorageError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Storage(err)
    }
}
