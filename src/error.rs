//! Error types for the maintenance jobs
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Janitor Error Enum ==
/// Unified error type for the maintenance subsystem.
///
/// Only pass-aborting failures surface as this type; per-file and per-board
/// failures are collected into the pass's stats snapshot instead.
#[derive(Error, Debug)]
pub enum JanitorError {
    /// A query against the authoritative store failed
    #[error("store query failed: {0}")]
    Store(String),

    /// A file-store operation (list/stat/delete) failed
    #[error("file store error: {0}")]
    FileStore(String),

    /// Requested job name does not exist (operational API only)
    #[error("unknown job: {0}")]
    UnknownJob(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for JanitorError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            JanitorError::Store(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            JanitorError::FileStore(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            JanitorError::UnknownJob(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the maintenance subsystem.
pub type Result<T> = std::result::Result<T, JanitorError>;
