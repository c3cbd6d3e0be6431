//! # Table Registry
//!
//! Holds the configured tables during startup, merges in discovered tables
//! and fills in column sets. Once routes are built the descriptors are
//! frozen behind `Arc`s and never change.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::errors::{SchemaError, SchemaResult};
use super::table::{TableConfig, TableDescriptor};
use crate::driver::{Driver, DriverResult};

/// Ordered, name-unique set of table descriptors
#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: Vec<TableDescriptor>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration entries, rejecting duplicate names
    pub fn from_configs(configs: Vec<TableConfig>) -> SchemaResult<Self> {
        let mut registry = Self::new();
        for config in configs {
            registry.register(config.into())?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, table: TableDescriptor) -> SchemaResult<()> {
        if self.contains(&table.name) {
            return Err(SchemaError::DuplicateTable(table.name));
        }
        self.tables.push(table);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.iter().any(|t| t.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn tables(&self) -> &[TableDescriptor] {
        &self.tables
    }

    pub fn names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Add every table the backend reports that is not configured already.
    ///
    /// Configured entries always win over discovered ones. Returns the
    /// number of tables added.
    pub async fn discover(&mut self, driver: &dyn Driver, writable: bool) -> DriverResult<usize> {
        let mut added = 0;
        for name in driver.tables().await? {
            if self.contains(&name) {
                debug!(table = %name, "discovered table already configured");
                continue;
            }
            self.tables.push(TableDescriptor::new(name).writable(writable));
            added += 1;
        }
        info!(added, driver = driver.name(), "table discovery complete");
        Ok(added)
    }

    /// Fetch the column set of every table.
    ///
    /// A table whose columns cannot be read keeps an empty column set, so
    /// every column-dependent clause is dropped for it. The failures are
    /// returned for reporting.
    pub async fn load_columns(&mut self, driver: &dyn Driver) -> Vec<SchemaError> {
        let mut failures = Vec::new();
        for table in &mut self.tables {
            match driver.columns(&table.name).await {
                Ok(columns) => {
                    debug!(table = %table.name, columns = columns.len(), "columns loaded");
                    table.set_columns(columns);
                }
                Err(err) => {
                    warn!(table = %table.name, error = %err, "column discovery failed");
                    table.set_columns(Vec::new());
                    failures.push(SchemaError::Unavailable {
                        table: table.name.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        failures
    }

    /// Freeze into shared descriptors for the request path
    pub fn freeze(self) -> Vec<Arc<TableDescriptor>> {
        self.tables.into_iter().map(Arc::new).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testing::StaticDriver;

    fn config(name: &str, writable: bool) -> TableConfig {
        TableConfig {
            name: name.to_string(),
            writable,
            owner_column: None,
            id_column: None,
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = TableRegistry::from_configs(vec![config("a", false), config("a", true)]);
        assert_eq!(result.unwrap_err(), SchemaError::DuplicateTable("a".into()));
    }

    #[tokio::test]
    async fn test_configured_tables_win_over_discovery() {
        let driver = StaticDriver::new()
            .with_table("students", &["id", "name"])
            .with_table("grades", &["id", "grade"]);

        let mut registry = TableRegistry::from_configs(vec![config("students", true)]).unwrap();
        let added = registry.discover(&driver, false).await.unwrap();

        assert_eq!(added, 1);
        assert_eq!(registry.names(), vec!["students", "grades"]);
        assert!(registry.get("students").unwrap().writable);
        assert!(!registry.get("grades").unwrap().writable);
    }

    #[tokio::test]
    async fn test_failed_column_probe_leaves_empty_columns() {
        let driver = StaticDriver::new().with_table("students", &["id", "name"]);

        let mut registry =
            TableRegistry::from_configs(vec![config("students", false), config("ghost", false)])
                .unwrap();
        let failures = registry.load_columns(&driver).await;

        assert_eq!(failures.len(), 1);
        assert!(matches!(&failures[0], SchemaError::Unavailable { table, .. } if table == "ghost"));
        assert_eq!(registry.get("students").unwrap().columns(), ["id", "name"]);
        assert!(registry.get("ghost").unwrap().columns().is_empty());
    }
}
