//! Statement assembly errors

use thiserror::Error;

pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// UPDATE or DELETE without a single WHERE condition
    #[error("{operation} on {table} requires at least one filter")]
    MissingConstraint {
        table: String,
        operation: &'static str,
    },

    /// Body carried no column the client may write
    #[error("No writable columns in payload for {0}")]
    NoWritableColumns(String),

    /// A row that is not a JSON object
    #[error("Row {0} is not a JSON object")]
    NotAnObject(usize),

    /// Owner-scoped table without a resolved identity
    #[error("Table {0} requires an identity")]
    MissingIdentity(String),
}
