//! CLI-specific error types
//!
//! Every CLI error is fatal: it is printed to stderr and the process exits
//! non-zero.

use std::io;

use thiserror::Error;

use crate::auth::AuthError;
use crate::driver::DriverError;
use crate::schema::SchemaError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file missing, unreadable or invalid
    #[error("{0}")]
    Config(String),

    /// stdout or runtime I/O
    #[error("{0}")]
    Io(String),

    /// Database, schema or identity setup failed
    #[error("{0}")]
    BootFailed(String),

    /// HTTP listener failed
    #[error("HTTP server failed: {0}")]
    Server(String),
}

impl CliError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::BootFailed(msg.into())
    }

    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "ROWGATE_CLI_CONFIG_ERROR",
            Self::Io(_) => "ROWGATE_CLI_IO_ERROR",
            Self::BootFailed(_) => "ROWGATE_CLI_BOOT_FAILED",
            Self::Server(_) => "ROWGATE_CLI_SERVER_FAILED",
        }
    }

    /// Rendered as `CODE: message` on stderr
    pub fn report(&self) -> String {
        format!("{}: {}", self.code(), self)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Io(format!("JSON error: {}", e))
    }
}

impl From<DriverError> for CliError {
    fn from(e: DriverError) -> Self {
        Self::BootFailed(e.to_string())
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<AuthError> for CliError {
    fn from(e: AuthError) -> Self {
        Self::Config(e.to_string())
    }
}
