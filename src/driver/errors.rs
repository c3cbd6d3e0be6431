//! Driver errors

use thiserror::Error;

use crate::marshal::MarshalError;

pub type DriverResult<T> = Result<T, DriverError>;

#[derive(Debug, Error)]
pub enum DriverError {
    /// Anything the SQL client reports
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Column discovery found no such table
    #[error("Table {0} not found")]
    UnknownTable(String),

    /// Streaming a result set failed
    #[error(transparent)]
    Marshal(#[from] MarshalError),

    #[error("Invalid database configuration: {0}")]
    Config(String),
}
