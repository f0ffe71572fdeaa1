//! # Engine Error Types
//!
//! Unified error handling for the session engine and its ambient stack, with
//! automatic HTTP conversion for both web frameworks the workspace supports.
//!
//! ## Design Philosophy
//!
//! Each variant maps to a specific HTTP status code and machine-readable
//! error code: a small set of caller-visible outcomes (`BadCredentials`,
//! `InvalidJwt`, `GrantFailed`, `RefreshFailed`, `RevokeFailed`) plus the
//! ambient infrastructure failures (`PersistenceError`, `FastIndexError`)
//! that those outcomes wrap.
//!
//! ## Error Categories
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        EngineError Categories                           │
//! ├─────────────────────────┬───────────────────┬────────────────────────────┤
//! │ Authentication (401)    │ Authorization(403)│ Validation (400)           │
//! ├─────────────────────────┼───────────────────┼────────────────────────────┤
//! │ BadCredentials          │ AccessDenied       │ ValidationError            │
//! │ InvalidJwt              │                   │ BadRequest                 │
//! ├─────────────────────────┴───────────────────┴────────────────────────────┤
//! │ Resources (404, 409)    │ Server (500, 503)                             │
//! ├─────────────────────────┼───────────────────────────────────────────────┤
//! │ NotFound                │ GrantFailed / RefreshFailed / RevokeFailed    │
//! │ Conflict                │ PersistenceError / FastIndexError             │
//! │                         │ InternalError / ServiceUnavailable            │
//! └─────────────────────────┴───────────────────────────────────────────────┘
//! ```
//!
//! ## Framework Integration
//!
//! - **Actix-web**: `impl ResponseError for EngineError`
//! - **Axum**: `impl IntoResponse for EngineError`

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::auth::codec::CodecError;

/// Result type alias for engine operations and handlers.
pub type EngineResult<T> = Result<T, EngineError>;

/// Why a decoded token was rejected. Kept distinct from the caller-visible
/// `InvalidJwt` variant's single message so that logging can retain the
/// real cause even though verification callers only ever see `InvalidJwt`
/// — a deliberate information-leak reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidJwtCause {
    Malformed,
    BadSignature,
    Expired,
    UnexpectedType,
    ClaimMismatch,
    NotFound,
}

impl std::fmt::Display for InvalidJwtCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Malformed => "malformed",
            Self::BadSignature => "bad_signature",
            Self::Expired => "expired",
            Self::UnexpectedType => "unexpected_type",
            Self::ClaimMismatch => "claim_mismatch",
            Self::NotFound => "not_found",
        };
        write!(f, "{s}")
    }
}

/// Engine error type with automatic HTTP status mapping.
#[derive(Debug, Error)]
pub enum EngineError {
    // =========================================================================
    // Authentication errors (401)
    // =========================================================================
    /// Username/password did not match the user directory.
    #[error("invalid credentials")]
    BadCredentials,

    /// A token failed signature, expiry, type, or liveness verification.
    /// Collapses every sub-cause into one outcome.
    #[error("invalid token ({cause})")]
    InvalidJwt { cause: InvalidJwtCause },

    // =========================================================================
    // Authorization errors (403)
    // =========================================================================
    /// Caller is authenticated but not permitted to act on this resource.
    #[error("access denied")]
    AccessDenied,

    // =========================================================================
    // Validation errors (400)
    // =========================================================================
    #[error("validation error")]
    ValidationError(#[from] ValidationErrors),

    #[error("invalid input: {message}")]
    BadRequest { message: String },

    // =========================================================================
    // Resource errors (404, 409)
    // =========================================================================
    #[error("resource not found: {resource}")]
    NotFound { resource: String },

    #[error("resource already exists: {resource}")]
    Conflict { resource: String },

    // =========================================================================
    // Orchestrator outcomes (500)
    // =========================================================================
    /// Grant failed; wraps a `PersistenceError`, `FastIndexError`, or
    /// codec `IssueFailed` cause.
    #[error("failed to grant a session")]
    GrantFailed,

    /// Refresh failed; same wrapped causes as `GrantFailed`.
    #[error("failed to refresh a session")]
    RefreshFailed,

    /// Revoke failed; wraps a `PersistenceError` cause.
    #[error("failed to revoke a session")]
    RevokeFailed,

    // =========================================================================
    // Ambient infrastructure errors (500)
    // =========================================================================
    /// Durable store (PostgreSQL) operation failed.
    #[error("durable store error")]
    PersistenceError(#[from] sqlx::Error),

    /// Fast-access store (Redis) operation failed.
    #[error("fast-access store error")]
    FastIndexError(#[from] redis::RedisError),

    /// Codec signing failed.
    #[error("failed to sign a token")]
    IssueFailed,

    /// Unspecified internal error, used as last resort.
    #[error("internal server error")]
    InternalError { message: String },

    /// A per-call deadline elapsed before the store responded.
    #[error("operation timed out")]
    DeadlineExceeded,

    /// Dependency (durable store, fast-access store) is unreachable.
    #[error("service unavailable: {service}")]
    ServiceUnavailable { service: String },
}

impl From<CodecError> for EngineError {
    /// Maps each distinct decode failure kind to its `InvalidJwt` cause, and
    /// signing failures to `IssueFailed`.
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Malformed => EngineError::InvalidJwt { cause: InvalidJwtCause::Malformed },
            CodecError::BadSignature => EngineError::InvalidJwt { cause: InvalidJwtCause::BadSignature },
            CodecError::Expired => EngineError::InvalidJwt { cause: InvalidJwtCause::Expired },
            CodecError::UnknownType => EngineError::InvalidJwt { cause: InvalidJwtCause::UnexpectedType },
            CodecError::ClaimMismatch => EngineError::InvalidJwt { cause: InvalidJwtCause::ClaimMismatch },
            CodecError::SignFailed(_) => EngineError::IssueFailed,
        }
    }
}

impl EngineError {
    /// Returns a machine-readable, stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadCredentials => "BAD_CREDENTIALS",
            Self::InvalidJwt { .. } => "INVALID_JWT",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::GrantFailed => "GRANT_FAILED",
            Self::RefreshFailed => "REFRESH_FAILED",
            Self::RevokeFailed => "REVOKE_FAILED",
            Self::PersistenceError(_) => "PERSISTENCE_ERROR",
            Self::FastIndexError(_) => "FAST_INDEX_ERROR",
            Self::IssueFailed => "ISSUE_FAILED",
            Self::InternalError { .. } => "INTERNAL_ERROR",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
        }
    }

    /// Returns the HTTP status code for this error. Source of truth for
    /// both the Actix-web and Axum integrations below.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadCredentials | Self::InvalidJwt { .. } => StatusCode::UNAUTHORIZED,
            Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::ValidationError(_) | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            Self::GrantFailed
            | Self::RefreshFailed
            | Self::RevokeFailed
            | Self::PersistenceError(_)
            | Self::FastIndexError(_)
            | Self::IssueFailed
            | Self::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Returns `true` for server-side (5xx) errors — logged at error level
    /// and never expose internal detail to the client.
    pub fn is_server_error(&self) -> bool {
        self.status_code().as_u16() >= 500
    }
}

/// Standard error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorResponse {
    pub fn new(error: &EngineError) -> Self {
        let details = match error {
            EngineError::ValidationError(errors) => Some(serde_json::to_value(errors).unwrap_or_default()),
            EngineError::InvalidJwt { cause } => Some(serde_json::json!({ "cause": cause.to_string() })),
            // Server errors: don't expose internal detail to the client.
            _ if error.is_server_error() => None,
            _ => None,
        };

        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            request_id: None,
            details,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }
}

impl ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let response = ErrorResponse::new(self);
        HttpResponse::build(self.status_code()).json(response)
    }
}

impl axum::response::IntoResponse for EngineError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.status_code() {
            StatusCode::UNAUTHORIZED => axum::http::StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN => axum::http::StatusCode::FORBIDDEN,
            StatusCode::BAD_REQUEST => axum::http::StatusCode::BAD_REQUEST,
            StatusCode::NOT_FOUND => axum::http::StatusCode::NOT_FOUND,
            StatusCode::CONFLICT => axum::http::StatusCode::CONFLICT,
            StatusCode::GATEWAY_TIMEOUT => axum::http::StatusCode::GATEWAY_TIMEOUT,
            StatusCode::SERVICE_UNAVAILABLE => axum::http::StatusCode::SERVICE_UNAVAILABLE,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        let response = ErrorResponse::new(&self);
        (status, axum::Json(response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_jwt_and_bad_credentials_return_401() {
        assert_eq!(EngineError::BadCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            EngineError::InvalidJwt { cause: InvalidJwtCause::Expired }.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn orchestrator_failures_return_500() {
        assert_eq!(EngineError::GrantFailed.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(EngineError::RefreshFailed.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(EngineError::RevokeFailed.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(EngineError::GrantFailed.is_server_error());
    }

    #[test]
    fn codec_errors_map_to_invalid_jwt_causes() {
        let mapped: EngineError = CodecError::Expired.into();
        assert!(matches!(mapped, EngineError::InvalidJwt { cause: InvalidJwtCause::Expired }));

        let mapped: EngineError = CodecError::SignFailed("boom".to_string()).into();
        assert!(matches!(mapped, EngineError::IssueFailed));
    }

    #[test]
    fn error_codes_are_screaming_snake_case() {
        assert_eq!(EngineError::BadCredentials.error_code(), "BAD_CREDENTIALS");
        assert_eq!(EngineError::NotFound { resource: "session".to_string() }.error_code(), "NOT_FOUND");
    }

    #[test]
    fn error_response_includes_timestamp() {
        let response = ErrorResponse::new(&EngineError::BadCredentials);
        let diff = chrono::Utc::now() - response.timestamp;
        assert!(diff.num_seconds() < 60);
    }

    #[test]
    fn error_response_with_request_id() {
        let request_id = Uuid::new_v4();
        let response = ErrorResponse::new(&EngineError::BadCredentials).with_request_id(request_id);
        assert_eq!(response.request_id, Some(request_id.to_string()));
    }
}
