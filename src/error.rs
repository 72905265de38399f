//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::domain::{AmountError, DomainError};
use crate::engine::EngineError;
use crate::ledger::LedgerError;
use crate::topup::GatewayError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Transient persistence failure: {0}")]
    Transient(#[source] sqlx::Error),

    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    /// Persistence failures that are safe to retry after re-fetching state:
    /// serialization failures, deadlocks, lock/statement timeouts and
    /// connectivity problems. Constraint violations are not.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Database(e) => is_transient_db_error(e),
            AppError::Transient(_) => true,
            _ => false,
        }
    }
}

impl From<AmountError> for AppError {
    fn from(err: AmountError) -> Self {
        AppError::Domain(err.into())
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Database(e) => AppError::Database(e),
            LedgerError::BalanceNotFound(id) => {
                AppError::Domain(DomainError::AccountNotFound(id.to_string()))
            }
            LedgerError::Corrupt(e) => AppError::Internal(format!("Stored balance invalid: {e}")),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let retryable = err.is_retryable();
        match err {
            EngineError::Domain(e) => AppError::Domain(e),
            EngineError::Database(e) | EngineError::Ledger(LedgerError::Database(e))
                if retryable =>
            {
                AppError::Transient(e)
            }
            EngineError::Ledger(e) => e.into(),
            EngineError::Database(e) => AppError::Database(e),
        }
    }
}

/// Classify a sqlx error as transient (retryable) or not
pub fn is_transient_db_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::PoolClosed => true,
        sqlx::Error::Database(db) => matches!(
            db.code().as_deref(),
            Some("40001") | Some("40P01") | Some("55P03") | Some("57014")
        ),
        _ => false,
    }
}

/// Check whether a sqlx error is a unique-constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            // 403 Forbidden
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone())),

            // 404 Not Found
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, "not_found", Some(what.clone())),

            // 409 Conflict
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),

            AppError::Auth(auth) => return auth.clone().into_response(),

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(domain_err) => match domain_err {
                DomainError::InsufficientFunds { .. } => (
                    StatusCode::BAD_REQUEST,
                    "insufficient_funds",
                    Some(domain_err.to_string()),
                ),
                DomainError::AccountNotVerified { party } => (
                    StatusCode::FORBIDDEN,
                    "account_not_verified",
                    Some(party.to_string()),
                ),
                DomainError::AccountNotFound(id) => {
                    (StatusCode::NOT_FOUND, "account_not_found", Some(id.clone()))
                }
                DomainError::AuthorizationMismatch => {
                    (StatusCode::FORBIDDEN, "pin_mismatch", None)
                }
                DomainError::MissingPayoutDestination => {
                    (StatusCode::BAD_REQUEST, "missing_payout_destination", None)
                }
                DomainError::InvalidAmount(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_amount", Some(msg.clone()))
                }
                DomainError::SameAccountTransfer => {
                    (StatusCode::BAD_REQUEST, "same_account_transfer", None)
                }
                DomainError::InvalidPin => (StatusCode::BAD_REQUEST, "invalid_pin", None),
                DomainError::BusinessRuleViolation(msg) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "business_rule_violation",
                    Some(msg.clone()),
                ),
            },

            // 5xx
            AppError::Transient(e) => {
                tracing::warn!("Retryable persistence failure: {:?}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "transient_failure", None)
            }
            AppError::Database(e) if is_transient_db_error(e) => {
                tracing::warn!("Transient database error: {:?}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "transient_failure", None)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Gateway(e) => {
                tracing::error!("Payment gateway error: {}", e);
                (StatusCode::BAD_GATEWAY, "gateway_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        // Persistence and upstream failures stay opaque to clients.
        let error = if status.is_server_error() {
            status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
