//! CLI command implementations
//!
//! Boot order for `serve`: load config, open the pool, build the table
//! registry (configured tables first, then discovered ones), read columns,
//! then bind the router.

use std::path::Path;

use axum::Router;
use serde_json::{json, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::args::Command;
use super::config::{Config, LogFormat};
use super::errors::{CliError, CliResult};
use super::io::write_json;
use crate::auth::{IdentityConfig, JwtManager};
use crate::driver::{self, Driver};
use crate::http_server::HttpServer;
use crate::rest_api::RestServer;
use crate::schema::TableRegistry;

/// Filter applied when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "rowgate=info,tower_http=info";

/// Main CLI entry point
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config } => serve(&config),
        Command::Tables { config } => tables(&config),
        Command::Token { config, subject } => token(&config, &subject),
    }
}

/// Install the global tracing subscriber.
///
/// A second call is a no-op.
pub fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let installed = match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init(),
    };
    if installed.is_err() {
        warn!("tracing subscriber already installed");
    }
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Serve every table until the process is stopped
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    init_tracing(config.log_format);

    runtime()?.block_on(async {
        let router = boot(&config).await?;
        let server = HttpServer::with_config(config.http.clone(), router);
        info!(addr = %server.socket_addr(), "starting rowgate");

        server
            .start()
            .await
            .map_err(|e| CliError::Server(e.to_string()))
    })
}

/// Print the resolved table set as JSON
pub fn tables(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    init_tracing(config.log_format);

    let report = runtime()?.block_on(inspect(&config))?;
    write_json(&report)
}

/// Print a freshly minted bearer token as JSON
pub fn token(config_path: &Path, subject: &str) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let token = mint_token(&config, subject)?;
    write_json(&json!({ "subject": subject, "token": token }))
}

/// Open the pool, resolve tables and build the table router
pub async fn boot(config: &Config) -> CliResult<Router> {
    let identity = config.identity.build()?;
    let driver = driver::connect(&config.database).await?;
    let registry = load_registry(config, driver.as_ref()).await?;

    let rest = RestServer::new(registry.freeze(), driver, identity);
    for path in rest.paths() {
        info!(path = %path, "route ready");
    }
    Ok(rest.router())
}

/// Resolve tables and report them as `{"driver", "tables": [...]}`
pub async fn inspect(config: &Config) -> CliResult<Value> {
    let driver = driver::connect(&config.database).await?;
    let registry = load_registry(config, driver.as_ref()).await?;

    let tables: Vec<Value> = registry
        .tables()
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "writable": t.writable,
                "owner_column": t.owner_column,
                "id_column": t.id_column.as_ref().map(|id| id.name.clone()),
                "columns": t.columns(),
            })
        })
        .collect();

    Ok(json!({ "driver": driver.name(), "tables": tables }))
}

async fn load_registry(config: &Config, driver: &dyn Driver) -> CliResult<TableRegistry> {
    let mut registry = TableRegistry::from_configs(config.tables.clone())?;

    if config.probe.enabled {
        registry.discover(driver, config.probe.writable).await?;
    }
    if registry.is_empty() {
        return Err(CliError::boot_failed("No tables to serve"));
    }

    let failures = registry.load_columns(driver).await;
    if !failures.is_empty() {
        warn!(
            failed = failures.len(),
            "some tables are served without a known column set"
        );
    }
    Ok(registry)
}

/// Issue a token with the configured JWT settings
pub fn mint_token(config: &Config, subject: &str) -> CliResult<String> {
    match &config.identity {
        IdentityConfig::Jwt(jwt) => Ok(JwtManager::new(jwt.clone()).issue_token(subject)?),
        _ => Err(CliError::config_error(
            "Tokens can only be minted when identity type is jwt",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::SqliteDriver;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn database(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("school.db");
        let driver = SqliteDriver::open(&path).await.unwrap();
        sqlx::query("CREATE TABLE students (student_id INTEGER PRIMARY KEY, name TEXT, grade INTEGER)")
            .execute(driver.pool())
            .await
            .unwrap();
        sqlx::query("CREATE TABLE teachers (teacher_id INTEGER PRIMARY KEY, name TEXT)")
            .execute(driver.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO students (name, grade) VALUES ('Ada', 9)")
            .execute(driver.pool())
            .await
            .unwrap();
        driver.pool().close().await;
        path
    }

    fn config(db: &Path, extra: &str) -> Config {
        Config::parse(&format!(
            r#"{{"database": {{"driver": "sqlite", "url": "sqlite://{}"}}{}}}"#,
            db.display(),
            extra
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_boot_serves_configured_tables() {
        let dir = TempDir::new().unwrap();
        let db = database(&dir).await;
        let config = config(&db, r#", "tables": [{"name": "students"}]"#);

        let router = boot(&config).await.unwrap();
        let response = router
            .oneshot(Request::builder().uri("/students?select=name").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let rows: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(rows, json!([{"name": "Ada"}]));
    }

    #[tokio::test]
    async fn test_inspect_with_probe() {
        let dir = TempDir::new().unwrap();
        let db = database(&dir).await;
        let config = config(
            &db,
            r#", "tables": [{"name": "students", "writable": true}], "probe": {"enabled": true}"#,
        );

        let report = inspect(&config).await.unwrap();
        assert_eq!(report["driver"], "sqlite");

        let tables = report["tables"].as_array().unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0]["name"], "students");
        assert_eq!(tables[0]["writable"], true);
        assert_eq!(tables[0]["columns"], json!(["student_id", "name", "grade"]));
        assert_eq!(tables[1]["name"], "teachers");
        assert_eq!(tables[1]["writable"], false);
    }

    #[tokio::test]
    async fn test_unknown_configured_table_served_without_columns() {
        let dir = TempDir::new().unwrap();
        let db = database(&dir).await;
        let config = config(&db, r#", "tables": [{"name": "ghosts"}]"#);

        let report = inspect(&config).await.unwrap();
        assert_eq!(report["tables"][0]["columns"], json!([]));
    }

    #[test]
    fn test_mint_token_requires_jwt_identity() {
        let config = Config::parse(
            r#"{"database": {"driver": "sqlite", "url": "x"}, "tables": [{"name": "t"}]}"#,
        )
        .unwrap();
        assert!(mint_token(&config, "u-1").is_err());
    }

    #[test]
    fn test_mint_token_round_trip() {
        let config = Config::parse(
            r#"{"database": {"driver": "sqlite", "url": "x"}, "tables": [{"name": "t"}],
                "identity": {"type": "jwt", "secret": "s3cret"}}"#,
        )
        .unwrap();

        let token = mint_token(&config, "u-1").unwrap();
        let IdentityConfig::Jwt(jwt) = &config.identity else {
            unreachable!()
        };
        let claims = JwtManager::new(jwt.clone()).validate_token(&token).unwrap();
        assert_eq!(claims.sub, "u-1");
    }
}
