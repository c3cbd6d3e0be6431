//! UPDATE assembly

use serde_json::{Map, Value};

use super::errors::{QueryError, QueryResult};
use super::params::QueryParams;
use super::statement::{append_write_bounds, Dialect, Statement, WhereClause};
use crate::schema::TableDescriptor;
use crate::value::SqlValue;

/// Build the UPDATE for a PATCH request.
///
/// Assignments come from writable known columns present in `changes`. At
/// least one WHERE condition must survive, owner scoping included.
pub fn build_update(
    table: &TableDescriptor,
    query: &QueryParams,
    changes: &Map<String, Value>,
    identity: Option<&SqlValue>,
    dialect: Dialect,
) -> QueryResult<Statement> {
    let mut clause = WhereClause::from_filters(table, query);
    clause.scope_to_owner(table, identity)?;
    if clause.is_empty() {
        return Err(QueryError::MissingConstraint {
            table: table.name.clone(),
            operation: "UPDATE",
        });
    }

    let mut assignments = Vec::new();
    let mut params = Vec::new();
    for column in table.valid_write_columns() {
        if let Some(value) = changes.get(column) {
            assignments.push(format!("{} = ?", column));
            params.push(SqlValue::from_json(value));
        }
    }
    if assignments.is_empty() {
        return Err(QueryError::NoWritableColumns(table.name.clone()));
    }

    let mut sql = format!("UPDATE {} SET {}", table.name, assignments.join(", "));
    append_write_bounds(&mut sql, &mut params, clause, table, query, dialect);

    Ok(Statement::new(sql, params))
}
