//! # Data Transfer Objects (DTOs)
//!
//! The wire shapes for this demo binary's HTTP surface over
//! [`shared::service::SessionEngine`]. `camelCase` on the wire to match
//! JavaScript conventions on the frontend; `snake_case` in Rust.

use serde::{Deserialize, Serialize};
use validator::Validate;

use shared::domain::{Jwt, JwtAuthentication};
use shared::validation::validators;

// =============================================================================
// REQUESTS
// =============================================================================

/// `POST /api/v1/auth/register` — creates a demo account. User registration
/// proper (email verification, profile fields, …) is out of scope for this
/// engine; this exists only so the example binary has something to
/// `/login` against.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// `POST /api/v1/auth/login` — the sign-in flow that precedes Grant.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(custom(function = "validators::not_blank"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// `POST /api/v1/auth/refresh`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// `POST /api/v1/auth/logout`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Returned by `/login`: a freshly granted token pair plus enough of the
/// principal to populate a client session without a second round-trip.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponseDto {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds, derived from its own issued/expiration
    /// pair rather than re-reading configuration.
    pub expires_in: i64,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl AuthResponseDto {
    pub fn from_session(session: &JwtAuthentication) -> Self {
        let access = session.pair().access();
        let refresh = session.pair().refresh();
        Self {
            access_token: access.encoded().as_str().to_string(),
            refresh_token: refresh.encoded().as_str().to_string(),
            token_type: "Bearer".to_string(),
            expires_in: ttl_seconds(access),
            user_id: session.user_id().as_str().to_string(),
            role: access.role_claim().map(|r| r.as_str().to_string()),
        }
    }
}

/// Returned by `/refresh`: the rotated-in pair. No principal
/// fields — the caller already has them from the original `/login`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponseDto {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl TokenResponseDto {
    pub fn from_session(session: &JwtAuthentication) -> Self {
        let access = session.pair().access();
        let refresh = session.pair().refresh();
        Self {
            access_token: access.encoded().as_str().to_string(),
            refresh_token: refresh.encoded().as_str().to_string(),
            token_type: "Bearer".to_string(),
            expires_in: ttl_seconds(access),
        }
    }
}

fn ttl_seconds(jwt: &Jwt) -> i64 {
    (jwt.expiration().as_datetime() - jwt.issued().as_datetime()).num_seconds()
}

/// Returned by `/me`: the principal carried by a verified access token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPrincipalDto {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl From<&Jwt> for SessionPrincipalDto {
    fn from(jwt: &Jwt) -> Self {
        Self {
            user_id: jwt.subject().as_str().to_string(),
            role: jwt.role_claim().map(|r| r.as_str().to_string()),
        }
    }
}

/// Generic message response for simple confirmations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_rejects_blank_username() {
        let request = LoginRequest { username: "   ".to_string(), password: "irrelevant".to_string() };
        assert!(request.validate().is_err());
    }

    #[test]
    fn login_request_accepts_populated_fields() {
        let request = LoginRequest { username: "alice".to_string(), password: "hunter2".to_string() };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn register_request_rejects_short_password() {
        let request = RegisterRequest { username: "alice".to_string(), password: "short".to_string() };
        let result = request.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().field_errors().contains_key("password"));
    }

    #[test]
    fn message_response_round_trips_through_json() {
        let response = MessageResponse::new("logged out");
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("logged out"));
    }
}
