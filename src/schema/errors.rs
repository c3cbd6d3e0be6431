//! Schema registry errors

use thiserror::Error;

pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// Two tables registered under one name
    #[error("Table {0} is configured more than once")]
    DuplicateTable(String),

    /// Column discovery failed
    #[error("Schema unavailable for table {table}: {reason}")]
    Unavailable { table: String, reason: String },
}
