//! DELETE assembly

use super::errors::{QueryError, QueryResult};
use super::params::QueryParams;
use super::statement::{append_write_bounds, Dialect, Statement, WhereClause};
use crate::schema::TableDescriptor;
use crate::value::SqlValue;

/// Build the DELETE for a DELETE request.
///
/// Refuses to run without at least one WHERE condition. Backends that can
/// return deleted rows get `RETURNING *` so the response lists them.
pub fn build_delete(
    table: &TableDescriptor,
    query: &QueryParams,
    identity: Option<&SqlValue>,
    dialect: Dialect,
) -> QueryResult<Statement> {
    let mut clause = WhereClause::from_filters(table, query);
    clause.scope_to_owner(table, identity)?;
    if clause.is_empty() {
        return Err(QueryError::MissingConstraint {
            table: table.name.clone(),
            operation: "DELETE",
        });
    }

    let mut sql = format!("DELETE FROM {}", table.name);
    let mut params = Vec::new();
    append_write_bounds(&mut sql, &mut params, clause, table, query, dialect);
    if dialect.delete_returning {
        sql.push_str(" RETURNING *");
    }

    Ok(Statement::new(sql, params))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn students() -> TableDescriptor {
        TableDescriptor::new("students")
            .writable(true)
            .with_columns(["id", "name", "grade"])
    }

    #[test]
    fn test_delete_requires_constraint() {
        for pairs in [vec![], vec![("unknown", "eq.1")], vec![("grade", "or.(eq.1)")]] {
            let query = QueryParams::parse(&pairs);
            assert!(matches!(
                build_delete(&students(), &query, None, Dialect::MYSQL),
                Err(QueryError::MissingConstraint { operation: "DELETE", .. })
            ));
        }
    }

    #[test]
    fn test_mysql_delete() {
        let query = QueryParams::parse(&[
            ("grade", "lt.50"),
            ("order", "grade"),
            ("limit", "5"),
            ("offset", "10"),
        ]);
        let statement = build_delete(&students(), &query, None, Dialect::MYSQL).unwrap();
        assert_eq!(
            statement.sql,
            "DELETE FROM students WHERE grade < ? ORDER BY grade DESC LIMIT 5"
        );
    }

    #[test]
    fn test_sqlite_delete_returns_rows() {
        let query = QueryParams::parse(&[("id", "in.(1,2)"), ("limit", "5")]);
        let statement = build_delete(&students(), &query, None, Dialect::SQLITE).unwrap();
        assert_eq!(
            statement.sql,
            "DELETE FROM students WHERE rowid IN (SELECT rowid FROM students \
             WHERE id IN (?, ?) LIMIT 5 OFFSET 0) RETURNING *"
        );
        assert_eq!(statement.params.len(), 2);

        let unbounded = QueryParams::parse(&[("id", "eq.1")]);
        let statement = build_delete(&students(), &unbounded, None, Dialect::SQLITE).unwrap();
        assert_eq!(statement.sql, "DELETE FROM students WHERE id = ? RETURNING *");
    }

    #[test]
    fn test_owner_scoped_delete() {
        let table = students().with_owner_column("name");
        let identity = SqlValue::Text("ann".into());
        let statement =
            build_delete(&table, &QueryParams::default(), Some(&identity), Dialect::MYSQL).unwrap();
        assert_eq!(statement.sql, "DELETE FROM students WHERE name = ?");
        assert_eq!(statement.params, vec![identity]);
    }
}
