//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the error type every handler returns.
//! It implements `actix_web::error::ResponseError`, turning each variant into an
//! HTTP status code and a JSON body of the form `{"error": "<message>"}`.
//!
//! Domain errors (`AuthError`, `StoreError`, `validator::ValidationErrors`)
//! convert into `AppError` through `From`, so handlers can use `?` directly.
//! Infrastructure failures are logged and surfaced with a generic message.

use actix_web::{error::ResponseError, http::header, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid bearer token (HTTP 401, with `WWW-Authenticate: Bearer`).
    Unauthorized(String),
    /// Malformed request or rejected credentials (HTTP 400).
    BadRequest(String),
    /// Requested resource does not exist or is not visible to the caller (HTTP 404).
    NotFound(String),
    /// A uniqueness constraint was violated (HTTP 409).
    Conflict(String),
    /// Unexpected server-side failure (HTTP 500).
    InternalServerError(String),
    /// Storage failure (HTTP 500).
    DatabaseError(String),
    /// Input failed field validation (HTTP 422).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized()
                .insert_header((header::WWW_AUTHENTICATE, "Bearer"))
                .json(json!({ "error": msg })),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg
            })),
            AppError::Conflict(msg) => HttpResponse::Conflict().json(json!({
                "error": msg
            })),
            // Internal details stay in the logs.
            AppError::InternalServerError(msg) | AppError::DatabaseError(msg) => {
                log::error!("{}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "error": "Internal server error"
                }))
            }
            AppError::ValidationError(msg) => HttpResponse::UnprocessableEntity().json(json!({
                "error": msg
            })),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Database(msg) => AppError::DatabaseError(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        match error {
            AuthError::InvalidCredentials => AppError::BadRequest(error.to_string()),
            AuthError::Unauthorized(msg) => AppError::Unauthorized(msg.to_string()),
            AuthError::Validation(errors) => errors.into(),
            AuthError::Conflict(msg) => AppError::Conflict(msg),
            AuthError::Store(store) => store.into(),
            AuthError::Token(_) | AuthError::Password(_) | AuthError::Blocking(_) => {
                AppError::InternalServerError(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenError;
    use actix_web::body::to_bytes;

    #[test]
    fn test_error_responses() {
        let error = AppError::Unauthorized("Invalid token".into());
        let response = error.error_response();
        assert_eq!(response.status(), 401);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );

        let error = AppError::BadRequest("Invalid input".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::NotFound("Resource not found".into());
        assert_eq!(error.error_response().status(), 404);

        let error = AppError::Conflict("Username already registered".into());
        assert_eq!(error.error_response().status(), 409);

        let error = AppError::ValidationError("username: too short".into());
        assert_eq!(error.error_response().status(), 422);

        let error = AppError::InternalServerError("Server error".into());
        assert_eq!(error.error_response().status(), 500);
    }

    #[actix_rt::test]
    async fn test_internal_details_are_not_leaked() {
        let error = AppError::DatabaseError("connection refused at 10.0.0.5".into());
        let body = to_bytes(error.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
    }

    #[test]
    fn test_auth_error_mapping() {
        let cases: Vec<(AuthError, u16)> = vec![
            (AuthError::InvalidCredentials, 400),
            (AuthError::Unauthorized("Not authenticated"), 401),
            (TokenError::InvalidToken.into(), 401),
            (AuthError::Conflict("taken".into()), 409),
            (StoreError::Conflict("taken".into()).into(), 409),
            (StoreError::Database("down".into()).into(), 500),
            (TokenError::Encoding("bad key".into()).into(), 500),
            (AuthError::Blocking("cancelled".into()), 500),
        ];
        for (error, status) in cases {
            let description = format!("{:?}", error);
            let response = AppError::from(error).error_response();
            assert_eq!(response.status().as_u16(), status, "{}", description);
        }
    }
}
