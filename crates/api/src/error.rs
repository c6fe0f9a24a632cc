use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use stanza_core::error::CoreError;
use stanza_importer::sources::SourceError;
use stanza_importer::store::StoreError;
use stanza_importer::ImporterError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`ImporterError`] for domain errors and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `stanza-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A pipeline error from `stanza-importer`.
    #[error(transparent)]
    Importer(#[from] ImporterError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Importer(importer) => classify_importer_error(importer),
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

fn classify_importer_error(err: &ImporterError) -> (StatusCode, &'static str, String) {
    match err {
        // Fatal precondition: surfaced verbatim so the operator knows to
        // run migrations rather than retry.
        ImporterError::BatchStorageMissing => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "BATCH_STORAGE_MISSING",
            err.to_string(),
        ),
        ImporterError::ImportNotFound(id) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Import with id {id} not found"),
        ),
        ImporterError::Core(core) => classify_core_error(core),
        ImporterError::Source(source) => classify_source_error(source),
        ImporterError::Store(store) => classify_store_error(store),
        ImporterError::Database(db) => classify_sqlx_error(db),
    }
}

fn classify_source_error(err: &SourceError) -> (StatusCode, &'static str, String) {
    // All source errors reflect an unreadable/misconfigured file path
    // supplied by the caller.
    (StatusCode::BAD_REQUEST, "SOURCE_ERROR", err.to_string())
}

fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::UnknownCollection(_) | StoreError::UnknownTaxonomy(_) => {
            (StatusCode::BAD_REQUEST, "UNKNOWN_DESTINATION", err.to_string())
        }
        StoreError::Rejected(msg) => (StatusCode::BAD_REQUEST, "REJECTED", msg.clone()),
        StoreError::Database(db) => classify_sqlx_error(db),
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
