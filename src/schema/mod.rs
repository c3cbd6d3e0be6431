//! Table configuration and column discovery
//!
//! A table is exposed only if it is configured or discovered at startup.
//! Column sets come from the backend and bound every column a client can
//! name in a select, filter, order or write.

mod errors;
mod registry;
mod table;

pub use errors::{SchemaError, SchemaResult};
pub use registry::TableRegistry;
pub use table::{GeneratorKind, IdColumn, IdColumnConfig, IdGenerator, TableConfig, TableDescriptor};
