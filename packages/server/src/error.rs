//! Errors that stop the server from starting or running.

use thiserror::Error;

use crate::domain::RepositoryError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Message store error: {0}")]
    Storage(#[from] RepositoryError),

    #[error("Invalid frontend origin: {0}")]
    InvalidOrigin(String),
}
