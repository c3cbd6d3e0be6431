//! CLI module for rowgate
//!
//! Provides command-line interface for:
//! - serve: Boot the database pool and serve tables over HTTP
//! - tables: Print the resolved table set
//! - token: Mint a bearer token for the jwt identity mode

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{boot, init_tracing, inspect, mint_token, run, run_command, serve, tables, token};
pub use config::{Config, LogFormat, ProbeConfig};
pub use errors::{CliError, CliResult};
pub use io::write_json;
