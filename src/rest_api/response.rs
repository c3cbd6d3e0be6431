//! # REST API Response Types
//!
//! Bodies the orchestrator builds itself; row data is streamed by the
//! marshaler instead.

use axum::http::StatusCode;
use serde::Serialize;

use crate::driver::RowOutcome;

/// One failed row of a POST batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    /// Index into the request array
    pub row: usize,
    pub error: String,
}

/// Result of a POST batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertReport {
    /// Rows inserted
    pub inserts: usize,
    pub errors: Vec<RowError>,
}

impl InsertReport {
    pub fn from_outcomes(outcomes: Vec<RowOutcome>) -> Self {
        let mut report = InsertReport {
            inserts: 0,
            errors: Vec::new(),
        };
        for (row, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(_) => report.inserts += 1,
                Err(err) => report.errors.push(RowError {
                    row,
                    error: err.to_string(),
                }),
            }
        }
        report
    }

    /// 200 when nothing failed, 500 when nothing succeeded, 207 otherwise
    pub fn status(&self) -> StatusCode {
        match (self.inserts, self.errors.len()) {
            (_, 0) => StatusCode::OK,
            (0, _) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::MULTI_STATUS,
        }
    }
}
