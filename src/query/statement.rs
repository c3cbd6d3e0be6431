//! # Statements
//!
//! Parameterized SQL plus the clause builders shared by the assemblers.

use std::fmt;

use tracing::debug;

use super::errors::{QueryError, QueryResult};
use super::filter::Condition;
use super::params::QueryParams;
use crate::schema::TableDescriptor;
use crate::value::SqlValue;

/// SQL text with `?` placeholders and the values bound to them, in order
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// How a backend bounds UPDATE and DELETE by `order`/`limit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteLimits {
    /// `... WHERE ... ORDER BY ... LIMIT n` on the statement itself
    Inline,

    /// `... WHERE rowid IN (SELECT rowid FROM t WHERE ... LIMIT n OFFSET m)`
    RowidSubquery,
}

/// Backend capabilities that change the shape of write statements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub write_limits: WriteLimits,

    /// DELETE can return the removed rows
    pub delete_returning: bool,
}

impl Dialect {
    pub const MYSQL: Dialect = Dialect {
        write_limits: WriteLimits::Inline,
        delete_returning: false,
    };

    // Stock SQLite builds reject ORDER BY/LIMIT on UPDATE and DELETE.
    pub const SQLITE: Dialect = Dialect {
        write_limits: WriteLimits::RowidSubquery,
        delete_returning: true,
    };
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::MYSQL
    }
}

/// AND-joined WHERE conditions with their bound values
#[derive(Debug, Default)]
pub(crate) struct WhereClause {
    terms: Vec<String>,
    params: Vec<SqlValue>,
}

impl WhereClause {
    /// Compile client filters, dropping unknown columns and operators
    pub fn from_filters(table: &TableDescriptor, query: &QueryParams) -> Self {
        let mut clause = WhereClause::default();
        for filter in &query.filters {
            if !table.has_column(&filter.column) {
                debug!(table = %table.name, column = %filter.column, "dropping filter on unknown column");
                continue;
            }
            match Condition::compile(&filter.column, &filter.raw) {
                Some(condition) => clause.push(condition),
                None => {
                    debug!(table = %table.name, column = %filter.column, filter = %filter.raw, "dropping unrecognized filter")
                }
            }
        }
        clause
    }

    /// Restrict to rows owned by `identity` when the table is owner-scoped
    pub fn scope_to_owner(
        &mut self,
        table: &TableDescriptor,
        identity: Option<&SqlValue>,
    ) -> QueryResult<()> {
        if let Some(column) = &table.owner_column {
            let identity = identity.ok_or_else(|| QueryError::MissingIdentity(table.name.clone()))?;
            self.push(Condition::equals(column, identity.clone()));
        }
        Ok(())
    }

    pub fn push(&mut self, condition: Condition) {
        let sql = condition.render(&mut self.params);
        self.terms.push(sql);
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn append_to(self, sql: &mut String, params: &mut Vec<SqlValue>) {
        if self.terms.is_empty() {
            return;
        }
        sql.push_str(" WHERE ");
        sql.push_str(&self.terms.join(" AND "));
        params.extend(self.params);
    }
}

/// Append the WHERE clause of an UPDATE or DELETE together with the
/// request's ordering and limit, in the form the dialect accepts.
pub(crate) fn append_write_bounds(
    sql: &mut String,
    params: &mut Vec<SqlValue>,
    clause: WhereClause,
    table: &TableDescriptor,
    query: &QueryParams,
    dialect: Dialect,
) {
    match (dialect.write_limits, query.limit) {
        (WriteLimits::Inline, _) => {
            clause.append_to(sql, params);
            sql.push_str(&order_clause(table, query));
            sql.push_str(&limit_clause(query, false));
        }
        (WriteLimits::RowidSubquery, Some(_)) => {
            sql.push_str(&format!(" WHERE rowid IN (SELECT rowid FROM {}", table.name));
            clause.append_to(sql, params);
            sql.push_str(&order_clause(table, query));
            sql.push_str(&limit_clause(query, true));
            sql.push(')');
        }
        // Without a limit the ordering cannot change which rows match.
        (WriteLimits::RowidSubquery, None) => clause.append_to(sql, params),
    }
}

/// ` ORDER BY ...` over known columns, or nothing
pub(crate) fn order_clause(table: &TableDescriptor, query: &QueryParams) -> String {
    let terms: Vec<String> = query
        .order
        .iter()
        .filter(|o| table.has_column(&o.column))
        .map(|o| format!("{} {}", o.column, o.direction.as_sql()))
        .collect();

    if terms.is_empty() {
        String::new()
    } else {
        format!(" ORDER BY {}", terms.join(", "))
    }
}

/// ` LIMIT n[ OFFSET m]`, or nothing when no positive limit was given
pub(crate) fn limit_clause(query: &QueryParams, with_offset: bool) -> String {
    match query.limit {
        Some(limit) if with_offset => format!(" LIMIT {} OFFSET {}", limit, query.offset),
        Some(limit) => format!(" LIMIT {}", limit),
        None => String::new(),
    }
}
