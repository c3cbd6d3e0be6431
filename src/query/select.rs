//! SELECT assembly

use super::errors::QueryResult;
use super::params::QueryParams;
use super::statement::{limit_clause, order_clause, Statement, WhereClause};
use crate::schema::TableDescriptor;
use crate::value::SqlValue;

/// Build the SELECT for a GET request.
///
/// The projection is the requested columns that exist, or `*`. Owner-scoped
/// tables always get `owner = identity` appended to the client filters.
pub fn build_select(
    table: &TableDescriptor,
    query: &QueryParams,
    identity: Option<&SqlValue>,
) -> QueryResult<Statement> {
    let columns = table.valid_read_columns(&query.select);
    let projection = if columns.is_empty() {
        "*".to_string()
    } else {
        columns.join(", ")
    };

    let mut clause = WhereClause::from_filters(table, query);
    clause.scope_to_owner(table, identity)?;

    let mut sql = format!("SELECT {} FROM {}", projection, table.name);
    let mut params = Vec::new();
    clause.append_to(&mut sql, &mut params);
    sql.push_str(&order_clause(table, query));
    sql.push_str(&limit_clause(query, true));

    Ok(Statement::new(sql, params))
}
