//! # Native Type Resolution
//!
//! Maps backend column type names to the decoder used for every value in
//! that column.

/// Which `SqlValue` variant a column decodes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeKind {
    Integer,
    Unsigned,
    Float,
    Text,
    Boolean,
    Bytes,
    Timestamp,
    Date,
    Time,
    Json,
}

/// Resolves a backend's native type name to a decode kind.
///
/// Unknown names fall back to `Text`.
pub trait TypeResolver: Send + Sync {
    fn resolve(&self, native: &str) -> DecodeKind;
}

/// SQLite declared types, with SQLite's affinity rules for the rest
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteTypes;

impl TypeResolver for SqliteTypes {
    fn resolve(&self, native: &str) -> DecodeKind {
        let name = native.trim().to_ascii_lowercase();
        match name.as_str() {
            "boolean" | "bool" => return DecodeKind::Boolean,
            "datetime" | "timestamp" => return DecodeKind::Timestamp,
            "date" => return DecodeKind::Date,
            "time" => return DecodeKind::Time,
            "" | "null" => return DecodeKind::Text,
            _ => {}
        }

        if name.contains("int") {
            DecodeKind::Integer
        } else if name.contains("char") || name.contains("clob") || name.contains("text") {
            DecodeKind::Text
        } else if name.contains("blob") {
            DecodeKind::Bytes
        } else if name.contains("real")
            || name.contains("floa")
            || name.contains("doub")
            || name.contains("numeric")
            || name.contains("decimal")
        {
            DecodeKind::Float
        } else {
            DecodeKind::Text
        }
    }
}

/// MySQL / MariaDB type names as reported by the wire protocol
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlTypes;

impl TypeResolver for MySqlTypes {
    fn resolve(&self, native: &str) -> DecodeKind {
        let name = native.trim().to_ascii_uppercase();
        let (base, unsigned) = match name.strip_suffix(" UNSIGNED") {
            Some(base) => (base, true),
            None => (name.as_str(), false),
        };

        match base {
            "BOOLEAN" | "BOOL" => DecodeKind::Boolean,
            // The wire name carries no width, so every BIT(M) reads as its
            // unsigned integer value
            "BIT" => DecodeKind::Unsigned,
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" | "YEAR" => {
                if unsigned {
                    DecodeKind::Unsigned
                } else {
                    DecodeKind::Integer
                }
            }
            "FLOAT" | "DOUBLE" | "REAL" => DecodeKind::Float,
            "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB"
            | "GEOMETRY" => DecodeKind::Bytes,
            "DATETIME" | "TIMESTAMP" => DecodeKind::Timestamp,
            "DATE" => DecodeKind::Date,
            "TIME" => DecodeKind::Time,
            "JSON" => DecodeKind::Json,
            // DECIMAL keeps its exact digits as text
            _ => DecodeKind::Text,
        }
    }
}
