//! # Query Translation
//!
//! Turns request query pairs and JSON bodies into parameterized statements.
//! Every client-supplied value reaches SQL as a bound parameter; identifiers
//! are only ever taken from the table's known column set.

mod delete;
mod errors;
pub mod filter;
mod insert;
pub mod params;
mod select;
mod statement;
mod update;

pub use delete::build_delete;
pub use errors::{QueryError, QueryResult};
pub use filter::{parse_filter, Condition, FilterOperator, Operator};
pub use insert::{build_insert, build_inserts};
pub use params::{Direction, FilterParam, OrderBy, QueryParams};
pub use select::build_select;
pub use statement::{Dialect, Statement, WriteLimits};
pub use update::build_update;
