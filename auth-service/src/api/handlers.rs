//! # Request Handlers
//!
//! Thin adapters between Actix-web and [`shared::service::SessionEngine`].
//! Each handler: extract → validate → call the engine → map the result to a
//! DTO. None of the session protocol itself lives here — see
//! [`shared::service::session_engine`] for Grant/Verify/Refresh/Revoke.
//!
//! ## Error Handling
//!
//! All handlers return `Result<HttpResponse, EngineError>`. `EngineError`
//! converts to the appropriate HTTP status code via its `ResponseError` impl.
//!
//! ## Authentication
//!
//! Protected endpoints (`logout-all`, `me`) pull the bearer access token off
//! the `Authorization` header themselves and call `SessionEngine::verify` —
//! there's no separate auth middleware layer for this one verification call.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use shared::domain::{EncodedToken, Jwt, Role};
use shared::errors::{EngineError, InvalidJwtCause};
use shared::validation;
use tracing::info;

use crate::AppState;

use super::dto::{
    AuthResponseDto, HealthResponse, LoginRequest, LogoutRequest, MessageResponse,
    RefreshTokenRequest, RegisterRequest, SessionPrincipalDto, TokenResponseDto,
};

// =============================================================================
// HEALTH CHECK
// =============================================================================

/// `GET /health` — for load balancers and monitoring.
pub async fn health_check() -> HttpResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        service: "auth-service".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };

    HttpResponse::Ok().json(response)
}

// =============================================================================
// REGISTRATION (demo-only; user CRUD is out of the session engine's scope)
// =============================================================================

/// `POST /api/v1/auth/register` — creates a demo account so there's
/// something to `/login` against. Not part of the session protocol itself.
pub async fn register(state: web::Data<AppState>, body: web::Json<RegisterRequest>) -> Result<HttpResponse, EngineError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let hash = state.password_hasher.hash(&body.password)?;
    let user = state.user_repository.create(&body.username, &hash, Role::User).await?;

    info!(username = %user.username, "account registered");
    Ok(HttpResponse::Created().json(MessageResponse::new("account created")))
}

// =============================================================================
// LOGIN -> Grant
// =============================================================================

/// `POST /api/v1/auth/login` — the sign-in flow that precedes Grant.
pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> Result<HttpResponse, EngineError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let session = state.engine.grant(&body.username, &body.password).await?;

    Ok(HttpResponse::Ok().json(AuthResponseDto::from_session(&session)))
}

// =============================================================================
// REFRESH
// =============================================================================

/// `POST /api/v1/auth/refresh` — rotates a refresh token for a new pair.
pub async fn refresh_token(state: web::Data<AppState>, body: web::Json<RefreshTokenRequest>) -> Result<HttpResponse, EngineError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let token = encoded_token(body.refresh_token)?;
    let session = state.engine.refresh(&token).await?;

    Ok(HttpResponse::Ok().json(TokenResponseDto::from_session(&session)))
}

// =============================================================================
// LOGOUT -> Verify(refresh) + Revoke
// =============================================================================

/// `POST /api/v1/auth/logout` — ends the session the given refresh token
/// belongs to.
pub async fn logout(state: web::Data<AppState>, body: web::Json<LogoutRequest>) -> Result<HttpResponse, EngineError> {
    let body = body.into_inner();
    validation::validate_request(&body)?;

    let token = encoded_token(body.refresh_token)?;
    let (_, session) = state.engine.verify_refresh(&token).await?;
    state.engine.revoke(&session).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("logged out")))
}

/// `POST /api/v1/auth/logout-all` — ends every session for the bearer's
/// subject.
pub async fn logout_all(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, EngineError> {
    let jwt = authenticate(&state, &req).await?;
    let count = state.engine.revoke_all_for_user(jwt.subject()).await?;

    info!(user_id = %jwt.subject(), sessions = count, "all sessions revoked");
    Ok(HttpResponse::Ok().json(MessageResponse::new(format!("revoked {count} session(s)"))))
}

// =============================================================================
// PROFILE -> Verify(access)
// =============================================================================

/// `GET /api/v1/auth/me` — the principal carried by a verified access token.
pub async fn get_profile(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, EngineError> {
    let jwt = authenticate(&state, &req).await?;

    Ok(HttpResponse::Ok().json(SessionPrincipalDto::from(&jwt)))
}

// =============================================================================
// HELPERS
// =============================================================================

fn encoded_token(raw: String) -> Result<EncodedToken, EngineError> {
    EncodedToken::new(raw).map_err(|_| EngineError::InvalidJwt { cause: InvalidJwtCause::Malformed })
}

/// Extracts the bearer access token and verifies it via the session engine.
async fn authenticate(state: &web::Data<AppState>, req: &HttpRequest) -> Result<Jwt, EngineError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(EngineError::InvalidJwt { cause: InvalidJwtCause::Malformed })?;

    let raw = header
        .strip_prefix("Bearer ")
        .ok_or(EngineError::InvalidJwt { cause: InvalidJwtCause::Malformed })?;

    let token = encoded_token(raw.to_string())?;
    state.engine.verify(&token).await
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn health_check_reports_healthy() {
        let response = health_check().await;
        assert_eq!(response.status(), actix_web::http::StatusCode::OK);
    }

    #[test]
    fn encoded_token_rejects_blank_input() {
        let err = encoded_token("   ".to_string()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidJwt { cause: InvalidJwtCause::Malformed }));
    }

    #[test]
    fn authorization_header_without_bearer_prefix_is_rejected() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_http_request();

        let header = req.headers().get("Authorization").and_then(|v| v.to_str().ok()).unwrap();
        assert!(header.strip_prefix("Bearer ").is_none());
    }

    #[test]
    fn missing_authorization_header_is_rejected() {
        let req = TestRequest::default().to_http_request();
        assert!(req.headers().get("Authorization").is_none());
    }
}
