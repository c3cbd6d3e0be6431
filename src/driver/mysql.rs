//! MySQL / MariaDB backend

use async_trait::async_trait;
use chrono::NaiveTime;
use sqlx::mysql::{MySql, MySqlArguments, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::debug;

use super::{Driver, DriverError, DriverResult, RowOutcome};
use crate::marshal::{marshal_rows, ColumnMeta, DecodeKind, DecodeRow, JsonSink, MySqlTypes};
use crate::query::{Dialect, Statement};
use crate::value::SqlValue;

// information_schema names come back with a binary collation on some
// servers, so they are cast to plain text.
const LIST_TABLES: &str = "SELECT CAST(TABLE_NAME AS CHAR) FROM information_schema.TABLES \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE' ORDER BY TABLE_NAME";

const LIST_COLUMNS: &str = "SELECT CAST(COLUMN_NAME AS CHAR) FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? ORDER BY ORDINAL_POSITION";

pub struct MySqlDriver {
    pool: MySqlPool,
}

impl MySqlDriver {
    pub async fn connect(url: &str, max_connections: u32) -> DriverResult<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn bind<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [SqlValue],
) -> Query<'q, MySql, MySqlArguments> {
    for value in params {
        query = match value {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Integer(v) => query.bind(*v),
            SqlValue::Unsigned(v) => query.bind(*v),
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
impl Driver for MySqlDriver {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn dialect(&self) -> Dialect {
        Dialect::MYSQL
    }

    async fn tables(&self) -> DriverResult<Vec<String>> {
        let names = sqlx::query_scalar::<MySql, String>(LIST_TABLES)
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    async fn columns(&self, table: &str) -> DriverResult<Vec<String>> {
        let columns = sqlx::query_scalar::<MySql, String>(LIST_COLUMNS)
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
        Ok(marshal_rows(rows, &MySqlTypes, sink).await?)
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

impl DecodeRow for MySqlRow {
    fn describe(&self) -> Vec<ColumnMeta> {
        self.columns()
            .iter()
            .map(|column| ColumnMeta {
                name: column.name().to_string(),
                type_name: column.type_info().name().to_string(),
            })
            .collect()
    }

    fn decode(&self, index: usize, kind: DecodeKind) -> Result<SqlValue, String> {
        decode_cell(self, index, kind).map_err(|e| e.to_string())
    }
}

fn decode_cell(row: &MySqlRow, index: usize, kind: DecodeKind) -> Result<SqlValue, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(SqlValue::Null);
    }

    let value = match kind {
        DecodeKind::Integer => SqlValue::Integer(row.try_get_unchecked(index)?),
        DecodeKind::Unsigned => SqlValue::Unsigned(row.try_get_unchecked(index)?),
        DecodeKind::Float => SqlValue::Float(row.try_get_unchecked(index)?),
        DecodeKind::Text => SqlValue::Text(row.try_get_unchecked(index)?),
        DecodeKind::Boolean => SqlValue::Boolean(row.try_get_unchecked(index)?),
        DecodeKind::Bytes => SqlValue::Bytes(row.try_get_unchecked(index)?),
        DecodeKind::Timestamp => SqlValue::Timestamp(row.try_get_unchecked(index)?),
        DecodeKind::Date => SqlValue::Date(row.try_get_unchecked(index)?),
        DecodeKind::Time => {
            let raw: Vec<u8> = row.try_get_unchecked(index)?;
            time_value(&raw)
        }
        DecodeKind::Json => {
            let text: String = row.try_get_unchecked(index)?;
            serde_json::from_str(&text)
                .map(SqlValue::Json)
                .unwrap_or(SqlValue::Text(text))
        }
    };
    Ok(value)
}

/// TIME is an interval (`-838:59:59` to `838:59:59`), so only values that
/// fit a time of day become `Time`; the rest keep their `[-]H:MM:SS` text.
///
/// `raw` is either the binary-protocol encoding (length byte 0, 8 or 12)
/// or the text-protocol string.
fn time_value(raw: &[u8]) -> SqlValue {
    if let [0] = raw {
        return NaiveTime::from_hms_opt(0, 0, 0)
            .map(SqlValue::Time)
            .unwrap_or_else(|| SqlValue::Text("00:00:00".to_string()));
    }

    if let [len @ (8 | 12), negative, d0, d1, d2, d3, h, m, s, rest @ ..] = raw {
        let days = u32::from_le_bytes([*d0, *d1, *d2, *d3]);
        let micros = match rest {
            [a, b, c, d, ..] if *len == 12 => u32::from_le_bytes([*a, *b, *c, *d]),
            _ => 0,
        };
        let negative = *negative != 0;

        if !negative && days == 0 {
            if let Some(time) =
                NaiveTime::from_hms_micro_opt(u32::from(*h), u32::from(*m), u32::from(*s), micros)
            {
                return SqlValue::Time(time);
            }
        }

        let hours = u64::from(days) * 24 + u64::from(*h);
        let mut text = format!("{}{:02}:{:02}:{:02}", if negative { "-" } else { "" }, hours, m, s);
        if micros > 0 {
            text.push_str(&format!(".{:06}", micros));
        }
        return SqlValue::Text(text);
    }

    let text = String::from_utf8_lossy(raw).into_owned();
    match NaiveTime::parse_from_str(&text, "%H:%M:%S%.f") {
        Ok(time) => SqlValue::Time(time),
        Err(_) => SqlValue::Text(text),
    }
}
