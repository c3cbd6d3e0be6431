//! # Table Descriptors
//!
//! The per-table configuration that every request consults: writability,
//! owner scoping, server-generated identifiers and the discovered column set.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::value::SqlValue;

/// Produces a fresh identifier for each inserted row
pub type IdGenerator = Arc<dyn Fn() -> SqlValue + Send + Sync>;

/// Built-in identifier generators selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    /// Hyphenated UUIDv4
    #[default]
    Uuid,

    /// UUIDv4 without hyphens
    UuidSimple,

    /// Milliseconds since the Unix epoch
    TimestampMillis,
}

impl GeneratorKind {
    pub fn generator(self) -> IdGenerator {
        match self {
            GeneratorKind::Uuid => Arc::new(|| SqlValue::Text(uuid::Uuid::new_v4().to_string())),
            GeneratorKind::UuidSimple => {
                Arc::new(|| SqlValue::Text(uuid::Uuid::new_v4().simple().to_string()))
            }
            GeneratorKind::TimestampMillis => {
                Arc::new(|| SqlValue::Integer(Utc::now().timestamp_millis()))
            }
        }
    }
}

/// A column whose value the server always supplies on insert
#[derive(Clone)]
pub struct IdColumn {
    pub name: String,
    generator: IdGenerator,
}

impl IdColumn {
    pub fn new(name: impl Into<String>, generator: IdGenerator) -> Self {
        Self {
            name: name.into(),
            generator,
        }
    }

    pub fn with_kind(name: impl Into<String>, kind: GeneratorKind) -> Self {
        Self::new(name, kind.generator())
    }

    /// Produce the next identifier
    pub fn generate(&self) -> SqlValue {
        (self.generator)()
    }
}

impl fmt::Debug for IdColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdColumn")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Everything the request path needs to know about one table
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    pub name: String,

    /// Whether POST/PATCH/DELETE are allowed
    pub writable: bool,

    /// Column holding the owning identity, when rows are owner-scoped
    pub owner_column: Option<String>,

    /// Server-generated identifier column
    pub id_column: Option<IdColumn>,

    columns: Vec<String>,
}

impl TableDescriptor {
    /// A read-only table with no known columns yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            writable: false,
            owner_column: None,
            id_column: None,
            columns: Vec::new(),
        }
    }

    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    pub fn with_owner_column(mut self, column: impl Into<String>) -> Self {
        self.owner_column = Some(column.into());
        self
    }

    pub fn with_id_column(mut self, column: IdColumn) -> Self {
        self.id_column = Some(column);
        self
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_columns(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Discovered columns, in table order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn set_columns(&mut self, columns: Vec<String>) {
        self.columns = columns;
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn is_owner_scoped(&self) -> bool {
        self.owner_column.is_some()
    }

    /// Requested columns that exist, in request order
    pub fn valid_read_columns<'a, I>(&self, requested: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        requested
            .into_iter()
            .filter(|c| self.has_column(c))
            .cloned()
            .collect()
    }

    /// Known columns a client may write: everything but the id and owner columns
    pub fn valid_write_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str).filter(move |c| {
            self.id_column.as_ref().map_or(true, |id| id.name != *c)
                && self.owner_column.as_deref() != Some(*c)
        })
    }
}

/// Table entry as written in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,

    #[serde(default)]
    pub writable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_column: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_column: Option<IdColumnConfig>,
}

/// Id column entry as written in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdColumnConfig {
    pub name: String,

    #[serde(default)]
    pub generator: GeneratorKind,
}

impl From<TableConfig> for TableDescriptor {
    fn from(config: TableConfig) -> Self {
        let mut table = TableDescriptor::new(config.name).writable(config.writable);
        if let Some(owner) = config.owner_column {
            table = table.with_owner_column(owner);
        }
        if let Some(id) = config.id_column {
            table = table.with_id_column(IdColumn::with_kind(id.name, id.generator));
        }
        table
    }
}
