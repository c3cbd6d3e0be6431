//! Configuration file loading
//!
//! The whole service is described by one JSON file. It is read and validated
//! before any connection is opened.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::auth::IdentityConfig;
use crate::driver::DatabaseConfig;
use crate::http_server::HttpServerConfig;
use crate::schema::TableConfig;

/// Table discovery settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Serve every base table the backend lists, not only configured ones
    #[serde(default)]
    pub enabled: bool,

    /// Writability of discovered tables
    #[serde(default)]
    pub writable: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,

    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub tables: Vec<TableConfig>,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        Self::parse(&content)
    }

    /// Parse and validate configuration text
    pub fn parse(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.tables.is_empty() && !self.probe.enabled {
            return Err(CliError::config_error(
                "No tables configured and table probing is disabled",
            ));
        }

        let mut seen = HashSet::new();
        for table in &self.tables {
            if table.name.trim().is_empty() {
                return Err(CliError::config_error("Table name must not be empty"));
            }
            if !seen.insert(table.name.as_str()) {
                return Err(CliError::config_error(format!(
                    "Table {} is configured more than once",
                    table.name
                )));
            }
            if let Some(id) = &table.id_column {
                if table.owner_column.as_deref() == Some(id.name.as_str()) {
                    return Err(CliError::config_error(format!(
                        "Table {}: id column and owner column must differ",
                        table.name
                    )));
                }
            }
        }

        match &self.identity {
            IdentityConfig::Header { header } if header.trim().is_empty() => {
                return Err(CliError::config_error("Identity header must not be empty"));
            }
            IdentityConfig::Jwt(jwt) if jwt.secret.is_empty() => {
                return Err(CliError::config_error("JWT secret must not be empty"));
            }
            _ => {}
        }

        Ok(())
    }
}
