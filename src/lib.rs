//! rowgate - relational tables as filterable, row-owned HTTP resources
//!
//! Each configured table is served at `/<table>`. Query-string filters,
//! ordering and pagination compile to parameterized SQL, result sets stream
//! back as JSON arrays, and owner-scoped tables are narrowed to the caller's
//! identity on every read and write.

pub mod auth;
pub mod cli;
pub mod driver;
pub mod http_server;
pub mod marshal;
pub mod query;
pub mod rest_api;
pub mod schema;
pub mod value;

pub use auth::IdentityResolver;
pub use driver::Driver;
pub use rest_api::RestServer;
pub use schema::{TableDescriptor, TableRegistry};
pub use value::SqlValue;
