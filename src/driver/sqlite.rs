//! SQLite backend

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::debug;

use super::{Driver, DriverError, DriverResult, RowOutcome};
use crate::marshal::{marshal_rows, ColumnMeta, DecodeKind, DecodeRow, JsonSink, SqliteTypes};
use crate::query::{Dialect, Statement};
use crate::value::SqlValue;

const LIST_TABLES: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name";

const LIST_COLUMNS: &str = "SELECT name FROM pragma_table_info(?) ORDER BY cid";

pub struct SqliteDriver {
    pool: SqlitePool,
}

impl SqliteDriver {
    /// Connect using a `sqlite://` URL, creating the file if needed
    pub async fn connect(url: &str, max_connections: u32) -> DriverResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self::from_pool(pool))
    }

    /// Open (or create) the database file at `path`
    pub async fn open(path: impl AsRef<Path>) -> DriverResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn bind<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in params {
        query = match value {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Integer(v) => query.bind(*v),
            // SQLite integers are signed 64-bit
            SqlValue::Unsigned(v) => match i64::try_from(*v) {
                Ok(v) => query.bind(v),
                Err(_) => query.bind(v.to_string()),
            },
            SqlValue::Float(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.as_str()),
            SqlValue::Boolean(v) => query.bind(*v),
            SqlValue::Bytes(v) => query.bind(v.as_slice()),
            SqlValue::Timestamp(v) => query.bind(*v),
            SqlValue::Date(v) => query.bind(*v),
            SqlValue::Time(v) => query.bind(*v),
            SqlValue::Json(v) => query.bind(v.to_string()),
        };
    }
    query
}

#[async_trait]
impl Driver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn dialect(&self) -> Dialect {
        Dialect::SQLITE
    }

    async fn tables(&self) -> DriverResult<Vec<String>> {
        let names = sqlx::query_scalar::<Sqlite, String>(LIST_TABLES)
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    async fn columns(&self, table: &str) -> DriverResult<Vec<String>> {
        let columns = sqlx::query_scalar::<Sqlite, String>(LIST_COLUMNS)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;
        if columns.is_empty() {
            return Err(DriverError::UnknownTable(table.to_string()));
        }
        Ok(columns)
    }

    async fn marshal_results(
        &self,
        statement: &Statement,
        sink: &mut dyn JsonSink,
    ) -> DriverResult<u64> {
        debug!(sql = %statement.sql, params = statement.params.len(), "streaming query");
        let rows = bind(sqlx::query(&statement.sql), &statement.params).fetch(&self.pool);
        Ok(marshal_rows(rows, &SqliteTypes, sink).await?)
    }

    async fn execute(&self, statement: &Statement) -> DriverResult<u64> {
        debug!(sql = %statement.sql, params = statement.params.len(), "executing statement");
        let done = bind(sqlx::query(&statement.sql), &statement.params)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }

    async fn insert_batch(&self, statements: &[Statement]) -> DriverResult<Vec<RowOutcome>> {
        let mut tx = self.pool.begin().await?;
        let mut outcomes = Vec::with_capacity(statements.len());
        for statement in statements {
            let result = bind(sqlx::query(&statement.sql), &statement.params)
                .execute(&mut *tx)
                .await;
            outcomes.push(result.map(|done| done.rows_affected()).map_err(DriverError::from));
        }
        tx.commit().await?;
        Ok(outcomes)
    }
}

impl DecodeRow for SqliteRow {
    fn describe(&self) -> Vec<ColumnMeta> {
        self.columns()
            .iter()
            .map(|column| {
                let declared = column.type_info();
                // Expressions carry no declared type; take the first row's storage class.
                let type_name = if declared.is_null() {
                    self.try_get_raw(column.ordinal())
                        .map(|raw| raw.type_info().name().to_string())
                        .unwrap_or_else(|_| declared.name().to_string())
                } else {
                    declared.name().to_string()
                };
                ColumnMeta {
                    name: column.name().to_string(),
                    type_name,
                }
            })
            .collect()
    }

    fn decode(&self, index: usize, kind: DecodeKind) -> Result<SqlValue, String> {
        decode_cell(self, index, kind).map_err(|e| e.to_string())
    }
}

/// Decode kind for one cell given its runtime storage class.
///
/// SQLite does not enforce declared types, so a cell only decodes with the
/// column's kind when its storage class can hold that kind. Anything else
/// decodes by what is actually stored.
fn cell_kind(storage: &str, declared: DecodeKind) -> DecodeKind {
    match (storage, declared) {
        (
            "INTEGER",
            DecodeKind::Integer | DecodeKind::Unsigned | DecodeKind::Boolean | DecodeKind::Float,
        ) => declared,
        ("INTEGER", _) => DecodeKind::Integer,
        ("REAL", _) => DecodeKind::Float,
        (
            "TEXT",
            DecodeKind::Text
            | DecodeKind::Timestamp
            | DecodeKind::Date
            | DecodeKind::Time
            | DecodeKind::Json,
        ) => declared,
        ("TEXT", _) => DecodeKind::Text,
        ("BLOB", _) => DecodeKind::Bytes,
        _ => declared,
    }
}

fn decode_cell(row: &SqliteRow, index: usize, declared: DecodeKind) -> Result<SqlValue, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let kind = cell_kind(raw.type_info().name(), declared);

    let value = match kind {
        DecodeKind::Integer => SqlValue::Integer(row.try_get_unchecked(index)?),
        DecodeKind::Unsigned => {
            let v: i64 = row.try_get_unchecked(index)?;
            u64::try_from(v).map(SqlValue::Unsigned).unwrap_or(SqlValue::Integer(v))
        }
        DecodeKind::Float => SqlValue::Float(row.try_get_unchecked(index)?),
        DecodeKind::Text => SqlValue::Text(row.try_get_unchecked(index)?),
        DecodeKind::Boolean => SqlValue::Boolean(row.try_get_unchecked(index)?),
        DecodeKind::Bytes => SqlValue::Bytes(row.try_get_unchecked(index)?),
        // Temporal text that does not parse is passed through as written
        DecodeKind::Timestamp => match row.try_get_unchecked::<NaiveDateTime, _>(index) {
            Ok(v) => SqlValue::Timestamp(v),
            Err(_) => SqlValue::Text(row.try_get_unchecked(index)?),
        },
        DecodeKind::Date => match row.try_get_unchecked::<NaiveDate, _>(index) {
            Ok(v) => SqlValue::Date(v),
            Err(_) => SqlValue::Text(row.try_get_unchecked(index)?),
        },
        DecodeKind::Time => match row.try_get_unchecked::<NaiveTime, _>(index) {
            Ok(v) => SqlValue::Time(v),
            Err(_) => SqlValue::Text(row.try_get_unchecked(index)?),
        },
        DecodeKind::Json => {
            let text: String = row.try_get_unchecked(index)?;
            serde_json::from_str(&text)
                .map(SqlValue::Json)
                .unwrap_or(SqlValue::Text(text))
        }
    };
    Ok(value)
}
