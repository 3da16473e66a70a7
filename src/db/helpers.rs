//! Database and response helpers shared by all resource handlers.
//!
//! Handlers return `Result<HttpResponse>`; these helpers collapse the
//! repetitive error arms:
//! - `require_record` turns a missing row into a 404
//! - `db_result` turns an unexpected store failure into a logged 500
//! - `unique_violation` detects Postgres unique-constraint errors (23505)
//!   so callers can answer 409 naming the offending field

use actix_web::HttpResponse;

use crate::models::common::ApiResponse;

/// Macro for handlers returning `Result<HttpResponse>`.
/// Converts a `DbResult<T>` to return `Ok(error_response)` on error.
#[macro_export]
macro_rules! ok_or_return {
    ($expr:expr) => {
        match $expr {
            Ok(val) => val,
            Err(response) => return Ok(response),
        }
    };
}

/// Result type for database operations that return an HttpResponse on error
pub type DbResult<T> = Result<T, HttpResponse>;

pub fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::<serde_json::Value>::error(message))
}

pub fn not_found(message: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<serde_json::Value>::error(message))
}

pub fn conflict(message: &str) -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::<serde_json::Value>::error(message))
}

pub fn server_error(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::<serde_json::Value>::error(message))
}

/// Reserved helper for field-level validation failures.
pub fn validation_error(errors: serde_json::Value) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(ApiResponse::<serde_json::Value>::error_with_details(
        "Validation failed",
        errors,
    ))
}

/// Unwrap an optional database result, returning NotFound if None.
pub fn require_record<T>(
    result: Result<Option<T>, sqlx::Error>,
    not_found_message: &str,
) -> DbResult<T> {
    match result {
        Ok(Some(record)) => Ok(record),
        Ok(None) => Err(not_found(not_found_message)),
        Err(e) => {
            tracing::error!("Database error: {}", e);
            Err(server_error("Database error"))
        }
    }
}

/// Unwrap a database result, returning InternalServerError on error.
pub fn db_result<T>(result: Result<T, sqlx::Error>) -> DbResult<T> {
    result.map_err(|e| {
        tracing::error!("Database error: {}", e);
        server_error("Database error")
    })
}

/// If `e` is a Postgres unique-constraint violation, return the name of the
/// violated constraint (e.g. `users_email_key`).
pub fn unique_violation(e: &sqlx::Error) -> Option<String> {
    if let sqlx::Error::Database(db_err) = e {
        if db_err.code().as_deref() == Some("23505") {
            return Some(db_err.constraint().unwrap_or("unique").to_string());
        }
    }
    None
}

/// Derive the offending column from a `<table>_<column>_key` constraint name.
pub fn constraint_field<'a>(constraint: &'a str, table: &str) -> &'a str {
    constraint
        .strip_prefix(table)
        .and_then(|s| s.strip_prefix('_'))
        .and_then(|s| s.strip_suffix("_key"))
        .unwrap_or(constraint)
}
