//! The transactional core: workflows that combine the stock ledger,
//! the request state machine and job transitions inside a single
//! database transaction each.

pub mod inventory;
pub mod jobs;

use thiserror::Error;

use crate::db::{RepositoryError, items::StockError};

/// Error from a workflow operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested quantity exceeds the stock on hand.
    #[error("not enough stock")]
    InsufficientStock,

    /// The referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The entity exists but its current status forbids the operation.
    #[error("{0}")]
    InvalidState(String),

    /// The input failed validation before touching the database.
    #[error("{0}")]
    Validation(String),

    /// Storage-layer failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<StockError> for ServiceError {
    fn from(e: StockError) -> Self {
        match e {
            StockError::InsufficientStock => Self::InsufficientStock,
            StockError::Database(e) => Self::Repository(RepositoryError::Database(e)),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}
