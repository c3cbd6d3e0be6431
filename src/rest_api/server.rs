//! # REST API Router
//!
//! One route per exposed table at `/<table>`, accepting any method and
//! dispatching inside the table's handler.

use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::{Query, Request, State};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tracing::debug;

use super::errors::{RestError, RestResult};
use super::handler::TableHandler;
use crate::auth::IdentityResolver;
use crate::driver::Driver;
use crate::query::QueryParams;
use crate::schema::TableDescriptor;

/// Request bodies above this size are rejected as malformed
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// REST API server state
pub struct RestServer {
    handlers: Vec<Arc<TableHandler>>,
}

impl RestServer {
    pub fn new(
        tables: Vec<Arc<TableDescriptor>>,
        driver: Arc<dyn Driver>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        let handlers = tables
            .into_iter()
            .map(|table| {
                Arc::new(TableHandler::new(
                    table,
                    Arc::clone(&driver),
                    Arc::clone(&identity),
                ))
            })
            .collect();
        Self { handlers }
    }

    /// Route paths, one per table
    pub fn paths(&self) -> Vec<String> {
        self.handlers
            .iter()
            .map(|h| route_path(&h.table().name))
            .collect()
    }

    /// Build the Axum router
    pub fn router(self) -> Router {
        let mut router = Router::new();
        for handler in self.handlers {
            let path = route_path(&handler.table().name);
            debug!(path = %path, writable = handler.table().writable, "registering table route");
            router = router.route(&path, any(dispatch).with_state(handler));
        }
        router
    }
}

fn route_path(table: &str) -> String {
    format!("/{}", table)
}

async fn dispatch(State(handler): State<Arc<TableHandler>>, request: Request) -> Response {
    match serve(&handler, request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn serve(handler: &TableHandler, request: Request) -> RestResult<Response> {
    let (parts, body) = request.into_parts();

    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
        .map_err(|e| RestError::MalformedPayload(e.body_text()))?;
    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| RestError::MalformedPayload(e.to_string()))?;

    handler.handle(&parts, &QueryParams::parse(&pairs), body).await
}
