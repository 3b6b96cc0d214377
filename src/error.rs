use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigError;
use crate::loader::LoadError;

#[derive(Debug)]
pub enum AppError {
    Database(sqlx::Error),
    BadRequest(String),
    NotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            AppError::BadRequest(message) => {
                tracing::warn!("Bad request: {message}");
                (StatusCode::BAD_REQUEST, message).into_response()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

// Ids are numeric; anything else names no resource.
impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::NotFound
    }
}

/// Failures before the listener starts. All of them end the process.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid database options: {0}")]
    Connect(sqlx::Error),
    #[error("database connection timed out after {0:?}")]
    ConnectionTimeout(Duration),
    #[error("database connection task failed: {0}")]
    ConnectTask(#[from] tokio::task::JoinError),
    #[error("failed to read schema {path}: {source}")]
    SchemaRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to apply schema: {0}")]
    SchemaApply(sqlx::Error),
    #[error("bulk load failed: {0}")]
    Load(#[from] LoadError),
    #[error("failed to bind listener: {0}")]
    Bind(std::io::Error),
    #[error("server error: {0}")]
    Serve(std::io::Error),
}
