//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::migration::Version;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("duplicate migration version {0}")]
    DuplicateVersion(Version),
    #[error("checksum mismatch for applied migration {version}: script body changed after apply")]
    ChecksumMismatch { version: Version },
    #[error("migration {version} is out of order: highest applied version is {applied}")]
    OutOfOrder { version: Version, applied: Version },
    #[error("migration {version} failed: {source}")]
    ScriptFailed {
        version: Version,
        #[source]
        source: sqlx::Error,
    },
    #[error("migration history: {0}")]
    History(#[from] sqlx::Error),
    #[error("invalid version tag '{0}': expected major.minor")]
    BadVersionTag(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Migration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "migration_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::Db(e) => match e {
                sqlx::Error::RowNotFound => (StatusCode::NOT_FOUND, "not_found"),
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                    (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            },
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
