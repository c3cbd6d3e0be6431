//! # Table Request Handler
//!
//! Per-table orchestration of one HTTP request: validate, resolve identity,
//! assemble the statement, execute it and shape the response. Every
//! validation failure is raised before any statement runs.

use std::io;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::request::Parts;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::{stream, StreamExt};
use serde_json::Value;
use tracing::{error, warn};

use super::errors::{RestError, RestResult};
use super::response::InsertReport;
use crate::auth::{AuthError, IdentityResolver};
use crate::driver::{Driver, DriverError};
use crate::marshal;
use crate::query::{build_delete, build_inserts, build_select, build_update, QueryParams, Statement};
use crate::schema::TableDescriptor;
use crate::value::SqlValue;

/// Chunks buffered between the marshaler and the response body
pub const ROW_CHANNEL_CAPACITY: usize = 16;

/// Serves one table
pub struct TableHandler {
    table: Arc<TableDescriptor>,
    driver: Arc<dyn Driver>,
    identity: Arc<dyn IdentityResolver>,
}

impl TableHandler {
    pub fn new(
        table: Arc<TableDescriptor>,
        driver: Arc<dyn Driver>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            table,
            driver,
            identity,
        }
    }

    pub fn table(&self) -> &TableDescriptor {
        &self.table
    }

    /// Dispatch on the request method
    pub async fn handle(&self, parts: &Parts, query: &QueryParams, body: Bytes) -> RestResult<Response> {
        match &parts.method {
            &Method::GET => self.get(parts, query).await,
            &Method::POST => self.post(parts, &body).await,
            &Method::PATCH => self.patch(parts, query, &body).await,
            &Method::DELETE => self.delete(parts, query).await,
            other => Err(RestError::UnsupportedMethod(other.to_string())),
        }
    }

    async fn get(&self, parts: &Parts, query: &QueryParams) -> RestResult<Response> {
        let identity = self.scoped_identity(parts)?;
        let statement = build_select(&self.table, query, identity.as_ref())?;
        self.stream_rows(statement).await
    }

    async fn post(&self, parts: &Parts, body: &Bytes) -> RestResult<Response> {
        self.require_writable(&Method::POST)?;
        let identity = self.scoped_identity(parts)?;
        self.require_columns()?;

        let Value::Array(rows) = parse_body(body)? else {
            return Err(RestError::MalformedPayload(
                "POST body must be a JSON array of objects".to_string(),
            ));
        };
        let statements = build_inserts(&self.table, &rows, identity.as_ref())?;

        let outcomes = self
            .driver
            .insert_batch(&statements)
            .await
            .map_err(|err| self.backend_error(err))?;

        let report = InsertReport::from_outcomes(outcomes);
        for failure in &report.errors {
            warn!(table = %self.table.name, row = failure.row, error = %failure.error, "row insert failed");
        }
        Ok((report.status(), Json(report)).into_response())
    }

    async fn patch(&self, parts: &Parts, query: &QueryParams, body: &Bytes) -> RestResult<Response> {
        self.require_writable(&Method::PATCH)?;
        let identity = self.scoped_identity(parts)?;
        self.require_columns()?;

        let Value::Object(changes) = parse_body(body)? else {
            return Err(RestError::MalformedPayload(
                "PATCH body must be a JSON object".to_string(),
            ));
        };
        let statement = build_update(
            &self.table,
            query,
            &changes,
            identity.as_ref(),
            self.driver.dialect(),
        )?;

        self.driver
            .execute(&statement)
            .await
            .map_err(|err| self.backend_error(err))?;
        Ok(StatusCode::OK.into_response())
    }

    async fn delete(&self, parts: &Parts, query: &QueryParams) -> RestResult<Response> {
        self.require_writable(&Method::DELETE)?;
        let identity = self.scoped_identity(parts)?;
        let statement = build_delete(&self.table, query, identity.as_ref(), self.driver.dialect())?;
        self.stream_rows(statement).await
    }

    fn require_writable(&self, method: &Method) -> RestResult<()> {
        if self.table.writable {
            return Ok(());
        }
        warn!(table = %self.table.name, method = %method, "write rejected on read-only table");
        Err(RestError::ReadOnly(self.table.name.clone()))
    }

    /// Writes need the column set to know what a client may touch
    fn require_columns(&self) -> RestResult<()> {
        if self.table.columns().is_empty() {
            return Err(RestError::SchemaUnavailable(self.table.name.clone()));
        }
        Ok(())
    }

    /// Resolve the caller's identity for owner-scoped tables
    fn scoped_identity(&self, parts: &Parts) -> RestResult<Option<SqlValue>> {
        if !self.table.is_owner_scoped() {
            return Ok(None);
        }

        let identity = self.identity.resolve(parts).map_err(|err| {
            warn!(table = %self.table.name, error = %err, "identity resolution failed");
            RestError::Forbidden(err)
        })?;
        if identity.is_blank() {
            warn!(table = %self.table.name, "empty identity on owner-scoped table");
            return Err(RestError::Forbidden(AuthError::EmptyIdentity));
        }
        Ok(Some(identity))
    }

    fn backend_error(&self, err: DriverError) -> RestError {
        error!(table = %self.table.name, error = %err, "statement execution failed");
        RestError::from(err)
    }

    /// Stream a row-returning statement as the response body.
    ///
    /// The status is only committed once the first chunk exists, so a
    /// statement that fails outright still gets a 500. Later failures cut
    /// the body short.
    async fn stream_rows(&self, statement: Statement) -> RestResult<Response> {
        let (mut sink, mut chunks) = marshal::channel(ROW_CHANNEL_CAPACITY);
        let driver = Arc::clone(&self.driver);
        let table = self.table.name.clone();

        tokio::spawn(async move {
            if let Err(err) = driver.marshal_results(&statement, &mut sink).await {
                error!(table = %table, error = %err, "result streaming failed");
                sink.fail(err.to_string()).await;
            }
        });

        let first = match chunks.next().await {
            Some(Ok(first)) => first,
            Some(Err(err)) => return Err(RestError::Backend(err.to_string())),
            None => {
                return Err(RestError::Backend(
                    "result stream closed before any output".to_string(),
                ))
            }
        };

        let body = stream::once(async move { Ok::<Bytes, io::Error>(first) }).chain(chunks);
        Ok((
            [(header::CONTENT_TYPE, "application/json")],
            Body::from_stream(body),
        )
            .into_response())
    }
}

fn parse_body(body: &Bytes) -> RestResult<Value> {
    serde_json::from_slice(body).map_err(|e| RestError::MalformedPayload(e.to_string()))
}
