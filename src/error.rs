//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::{FormRejection, JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::ledger::LedgerError;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Invalid API keys, bad callback signatures, missing admin role
/// - **Resource Errors**: Requested rows not found, or already in a final state
/// - **Validation Errors**: Malformed or out-of-range input
/// - **Rule Errors**: Ledger rules rejected the operation
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// API key is missing, invalid, or inactive.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Settlement callback signature is missing or does not match.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Authenticated, but not an administrator.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("Administrator role required")]
    Forbidden,

    /// The authenticated user has no magic account.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Account not found")]
    AccountNotFound,

    /// Returns HTTP 404 Not Found.
    #[error("Payment not found")]
    PaymentNotFound,

    /// A config row looked up by id or name does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("No config setting found for {0}")]
    ConfigNotFound(String),

    /// The payment already left the `pending` state.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Payment already settled")]
    PaymentAlreadySettled,

    /// Request fields failed validation.
    ///
    /// Returns HTTP 400 Bad Request with `{"errors": [...]}`.
    #[error("Invalid request: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// A ledger rule rejected the operation.
    ///
    /// Returns HTTP 200 with `{"errors": ["<message>"]}`. Account clients
    /// read business-rule failures from the `errors` field of a normal
    /// response, so these are not HTTP errors.
    #[error(transparent)]
    Rule(#[from] LedgerError),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// Validation and rule errors use the `errors` list the account UI reads:
/// ```json
/// { "errors": ["Not enough funds available. Please add funds."] }
/// ```
///
/// Everything else returns:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `Rule` → 200 OK
/// - `Validation` → 400 Bad Request
/// - `InvalidApiKey`, `InvalidSignature` → 401 Unauthorized
/// - `Forbidden` → 403 Forbidden
/// - `AccountNotFound`, `PaymentNotFound`, `ConfigNotFound` → 404 Not Found
/// - `PaymentAlreadySettled` → 409 Conflict
/// - `Database` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Rule(ref rule) => {
                return (StatusCode::OK, Json(json!({ "errors": [rule.to_string()] })))
                    .into_response();
            }
            AppError::Validation(ref errors) => {
                return (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors })))
                    .into_response();
            }
            AppError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                "invalid_api_key",
                self.to_string(),
            ),
            AppError::InvalidSignature => (
                StatusCode::UNAUTHORIZED,
                "invalid_signature",
                self.to_string(),
            ),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            AppError::AccountNotFound => {
                (StatusCode::NOT_FOUND, "account_not_found", self.to_string())
            }
            AppError::PaymentNotFound => {
                (StatusCode::NOT_FOUND, "payment_not_found", self.to_string())
            }
            AppError::ConfigNotFound(_) => {
                (StatusCode::NOT_FOUND, "config_not_found", self.to_string())
            }
            AppError::PaymentAlreadySettled => (
                StatusCode::CONFLICT,
                "payment_already_settled",
                self.to_string(),
            ),
            AppError::Database(ref err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
