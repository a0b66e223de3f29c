use thiserror::Error;

use crate::services::StoreError;

/// Errors surfaced by the proximity search operations
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store failure: {0}")]
    Store(#[from] StoreError),
}

impl SearchError {
    /// HTTP status the transport layer maps this error to
    pub fn status_code(&self) -> u16 {
        match self {
            SearchError::NotFound(_) => 404,
            SearchError::InvalidInput(_) => 400,
            SearchError::Conflict(_) => 409,
            SearchError::Store(_) => 500,
        }
    }
}
