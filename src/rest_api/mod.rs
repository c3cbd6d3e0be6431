//! # REST API Module
//!
//! Exposes each table as a resource: GET reads, POST inserts a batch,
//! PATCH updates and DELETE removes, all narrowed by query-string filters
//! and, for owner-scoped tables, by the caller's identity.

pub mod errors;
pub mod handler;
pub mod response;
pub mod server;

pub use errors::{ErrorResponse, RestError, RestResult};
pub use handler::TableHandler;
pub use response::{InsertReport, RowError};
pub use server::RestServer;
