//! A fixed-schema driver for unit tests that never touches a database.

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{Driver, DriverError, DriverResult, RowOutcome};
use crate::marshal::JsonSink;
use crate::query::{Dialect, Statement};

#[derive(Default)]
pub struct StaticDriver {
    tables: Vec<(String, Vec<String>)>,
    dialect: Option<Dialect>,
    executed: Mutex<Vec<Statement>>,
}

impl StaticDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, columns: &[&str]) -> Self {
        self.tables.push((
            name.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
        ));
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Every statement run so far
    pub fn executed(&self) -> Vec<Statement> {
        self.executed.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn record(&self, statement: &Statement) {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(statement.clone());
        }
    }
}

#[async_trait]
impl Driver for StaticDriver {
    fn name(&self) -> &'static str {
        "static"
    }

    fn dialect(&self) -> Dialect {
        self.dialect.unwrap_or_default()
    }

    async fn tables(&self) -> DriverResult<Vec<String>> {
        Ok(self.tables.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn columns(&self, table: &str) -> DriverResult<Vec<String>> {
        self.tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, columns)| columns.clone())
            .ok_or_else(|| DriverError::UnknownTable(table.to_string()))
    }

    async fn marshal_results(
        &self,
        statement: &Statement,
        sink: &mut dyn JsonSink,
    ) -> DriverResult<u64> {
        self.record(statement);
        sink.write_chunk(Bytes::from_static(b"[]"))
            .await
            .map_err(crate::marshal::MarshalError::from)?;
        Ok(0)
    }

    async fn execute(&self, statement: &Statement) -> DriverResult<u64> {
        self.record(statement);
        Ok(1)
    }

    async fn insert_batch(&self, statements: &[Statement]) -> DriverResult<Vec<RowOutcome>> {
        Ok(statements
            .iter()
            .map(|statement| {
                self.record(statement);
                Ok(1)
            })
            .collect())
    }
}
