//! # Request Validation Helpers
//!
//! Utilities for validating incoming request DTOs using the `validator`
//! crate, for the thin example HTTP surface's login/refresh request bodies.
//! The engine's core operations never see these — the session orchestrator
//! takes plain strings/value objects, not wire DTOs.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shared::validation::{validate_request, validators};
//! use validator::Validate;
//!
//! #[derive(Validate)]
//! struct LoginRequest {
//!     #[validate(custom(function = "validators::not_blank"))]
//!     username: String,
//!     #[validate(length(min = 1))]
//!     password: String,
//! }
//!
//! async fn handler(body: Json<LoginRequest>) -> Result<impl Responder, EngineError> {
//!     validate_request(&body)?;
//!     // Validation passed, continue...
//! }
//! ```

use crate::errors::EngineError;
use serde::de::DeserializeOwned;
use validator::Validate;

/// Validates a request DTO that implements `Validate`.
///
/// ## Errors
///
/// Returns `EngineError::ValidationError` with field-level details if
/// validation fails.
pub fn validate_request<T: Validate>(data: &T) -> Result<(), EngineError> {
    data.validate().map_err(EngineError::ValidationError)
}

/// Parses a JSON string and validates it in one step.
///
/// ## Errors
///
/// - `EngineError::BadRequest` if JSON parsing fails
/// - `EngineError::ValidationError` if validation fails
pub fn parse_and_validate<T: DeserializeOwned + Validate>(json: &str) -> Result<T, EngineError> {
    let data: T = serde_json::from_str(json).map_err(|e| EngineError::BadRequest { message: e.to_string() })?;
    validate_request(&data)?;
    Ok(data)
}

/// Custom validation functions for use with `#[validate(custom)]`.
pub mod validators {
    use validator::ValidationError;

    /// Validates that a string is not blank (empty or whitespace-only).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("blank"));
        }
        Ok(())
    }
}
