//! INSERT assembly

use serde_json::{Map, Value};

use super::errors::{QueryError, QueryResult};
use super::statement::Statement;
use crate::schema::TableDescriptor;
use crate::value::SqlValue;

/// Build one INSERT for a single body object.
///
/// Only writable known columns are taken from the object. The id column is
/// always generated and the owner column always set to `identity`, whatever
/// the client sent for them.
pub fn build_insert(
    table: &TableDescriptor,
    row: &Map<String, Value>,
    identity: Option<&SqlValue>,
) -> QueryResult<Statement> {
    let mut columns: Vec<&str> = Vec::new();
    let mut params = Vec::new();

    for column in table.valid_write_columns() {
        if let Some(value) = row.get(column) {
            columns.push(column);
            params.push(SqlValue::from_json(value));
        }
    }

    if let Some(id) = &table.id_column {
        columns.push(&id.name);
        params.push(id.generate());
    }

    if let Some(owner) = &table.owner_column {
        let identity = identity.ok_or_else(|| QueryError::MissingIdentity(table.name.clone()))?;
        columns.push(owner);
        params.push(identity.clone());
    }

    if columns.is_empty() {
        return Err(QueryError::NoWritableColumns(table.name.clone()));
    }

    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.name,
        columns.join(", "),
        placeholders
    );
    Ok(Statement::new(sql, params))
}

/// Build one INSERT per element of a POST body.
///
/// Every element must be an object; the first that is not rejects the
/// whole batch before anything runs.
pub fn build_inserts(
    table: &TableDescriptor,
    rows: &[Value],
    identity: Option<&SqlValue>,
) -> QueryResult<Vec<Statement>> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let object = row.as_object().ok_or(QueryError::NotAnObject(index))?;
            build_insert(table, object, identity)
        })
        .collect()
}
