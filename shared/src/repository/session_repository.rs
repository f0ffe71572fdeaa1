//! # Durable Session Repository
//!
//! The record-of-truth store for [`JwtAuthentication`] sessions. Backed by
//! a single `sessions` table holding both halves of the token pair side by
//! side.
//!
//! Unique indexes on `access_token` and `refresh_token` are the
//! database-level backstop for the engine's "never issue a duplicate
//! encoded token" expectation; a violation surfaces as
//! [`EngineError::Conflict`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::jwt::{Jwt, JwtPair, JwtType};
use crate::domain::session::{JwtAuthentication, SessionId};
use crate::domain::value_objects::{ClaimValue, Claims, EncodedToken, Expiration, Issued, Subject};
use crate::errors::EngineError;

/// Port trait so the session orchestrator can be tested against a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Inserts a new session or updates an existing one (by id), atomically.
    async fn save(&self, session: JwtAuthentication) -> Result<JwtAuthentication, EngineError>;

    async fn find_by_access_token(&self, token: &EncodedToken) -> Result<Option<JwtAuthentication>, EngineError>;

    async fn find_by_refresh_token(&self, token: &EncodedToken) -> Result<Option<JwtAuthentication>, EngineError>;

    async fn find_all_by_user(&self, user_id: &Subject) -> Result<Vec<JwtAuthentication>, EngineError>;

    async fn delete_by_id(&self, id: SessionId) -> Result<(), EngineError>;

    async fn delete_all_by_user(&self, user_id: &Subject) -> Result<u64, EngineError>;

    /// Deletes every session whose refresh token expired before `instant`.
    /// Used by the background purger.
    async fn delete_all_refresh_expired_before(&self, instant: DateTime<Utc>) -> Result<u64, EngineError>;
}

/// PostgreSQL-backed [`SessionRepository`].
#[derive(Debug, Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, session: JwtAuthentication) -> Result<JwtAuthentication, EngineError> {
        let access = session.pair().access();
        let refresh = session.pair().refresh();

        let row: SessionRow = sqlx::query_as(
            r#"
            INSERT INTO sessions (
                user_id,
                access_token, access_type, access_subject, access_claims, access_issued, access_expiration,
                refresh_token, refresh_type, refresh_subject, refresh_claims, refresh_issued, refresh_expiration
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(session.user_id().as_str())
        .bind(access.encoded().as_str())
        .bind(access.token_type().token_use())
        .bind(access.subject().as_str())
        .bind(Json(access.claims().to_owned_map()))
        .bind(access.issued().as_datetime())
        .bind(access.expiration().as_datetime())
        .bind(refresh.encoded().as_str())
        .bind(refresh.token_type().token_use())
        .bind(refresh.subject().as_str())
        .bind(Json(refresh.claims().to_owned_map()))
        .bind(refresh.issued().as_datetime())
        .bind(refresh.expiration().as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(map_save_error)?;

        row.into_session()
    }

    async fn update(&self, id: SessionId, session: JwtAuthentication) -> Result<JwtAuthentication, EngineError> {
        let access = session.pair().access();
        let refresh = session.pair().refresh();

        let row: SessionRow = sqlx::query_as(
            r#"
            UPDATE sessions SET
                access_token = $1, access_type = $2, access_subject = $3, access_claims = $4, access_issued = $5, access_expiration = $6,
                refresh_token = $7, refresh_type = $8, refresh_subject = $9, refresh_claims = $10, refresh_issued = $11, refresh_expiration = $12
            WHERE id = $13
            RETURNING *
            "#,
        )
        .bind(access.encoded().as_str())
        .bind(access.token_type().token_use())
        .bind(access.subject().as_str())
        .bind(Json(access.claims().to_owned_map()))
        .bind(access.issued().as_datetime())
        .bind(access.expiration().as_datetime())
        .bind(refresh.encoded().as_str())
        .bind(refresh.token_type().token_use())
        .bind(refresh.subject().as_str())
        .bind(Json(refresh.claims().to_owned_map()))
        .bind(refresh.issued().as_datetime())
        .bind(refresh.expiration().as_datetime())
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_save_error)?;

        match row {
            Some(row) => row.into_session(),
            None => Err(EngineError::NotFound { resource: "session".to_string() }),
        }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn save(&self, session: JwtAuthentication) -> Result<JwtAuthentication, EngineError> {
        match session.id() {
            Some(id) => self.update(id, session).await,
            None => self.insert(session).await,
        }
    }

    async fn find_by_access_token(&self, token: &EncodedToken) -> Result<Option<JwtAuthentication>, EngineError> {
        let row: Option<SessionRow> = sqlx::query_as("SELECT * FROM sessions WHERE access_token = $1")
            .bind(token.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(EngineError::PersistenceError)?;

        row.map(|r| r.into_session()).transpose()
    }

    async fn find_by_refresh_token(&self, token: &EncodedToken) -> Result<Option<JwtAuthentication>, EngineError> {
        let row: Option<SessionRow> = sqlx::query_as("SELECT * FROM sessions WHERE refresh_token = $1")
            .bind(token.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(EngineError::PersistenceError)?;

        row.map(|r| r.into_session()).transpose()
    }

    async fn find_all_by_user(&self, user_id: &Subject) -> Result<Vec<JwtAuthentication>, EngineError> {
        let rows: Vec<SessionRow> = sqlx::query_as("SELECT * FROM sessions WHERE user_id = $1")
            .bind(user_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(EngineError::PersistenceError)?;

        rows.into_iter().map(|r| r.into_session()).collect()
    }

    async fn delete_by_id(&self, id: SessionId) -> Result<(), EngineError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(EngineError::PersistenceError)?;

        if result.rows_affected() == 0 {
            return Err(EngineError::NotFound { resource: "session".to_string() });
        }

        Ok(())
    }

    async fn delete_all_by_user(&self, user_id: &Subject) -> Result<u64, EngineError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(EngineError::PersistenceError)?;

        Ok(result.rows_affected())
    }

    async fn delete_all_refresh_expired_before(&self, instant: DateTime<Utc>) -> Result<u64, EngineError> {
        let result = sqlx::query("DELETE FROM sessions WHERE refresh_expiration < $1")
            .bind(instant)
            .execute(&self.pool)
            .await
            .map_err(EngineError::PersistenceError)?;

        Ok(result.rows_affected())
    }
}

fn map_save_error(e: sqlx::Error) -> EngineError {
    if let sqlx::Error::Database(ref db_err) = e {
        if let Some(constraint) = db_err.constraint() {
            if constraint.contains("access_token") {
                return EngineError::Conflict { resource: "access_token".to_string() };
            }
            if constraint.contains("refresh_token") {
                return EngineError::Conflict { resource: "refresh_token".to_string() };
            }
        }
    }
    EngineError::PersistenceError(e)
}

/// Row shape of the `sessions` table. Kept private — callers only ever see
/// [`JwtAuthentication`].
#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: String,
    access_token: String,
    #[allow(dead_code)]
    access_type: String,
    access_subject: String,
    access_claims: Json<BTreeMap<String, ClaimValue>>,
    access_issued: DateTime<Utc>,
    access_expiration: DateTime<Utc>,
    refresh_token: String,
    #[allow(dead_code)]
    refresh_type: String,
    refresh_subject: String,
    refresh_claims: Json<BTreeMap<String, ClaimValue>>,
    refresh_issued: DateTime<Utc>,
    refresh_expiration: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> Result<JwtAuthentication, EngineError> {
        let corrupt = || EngineError::InternalError { message: "stored session row violates Jwt invariants".to_string() };

        let access_claims = Claims::new(self.access_claims.0).map_err(|_| corrupt())?;
        let access = Jwt::new(
            EncodedToken::new(self.access_token).map_err(|_| corrupt())?,
            JwtType::Access,
            Subject::new(self.access_subject).map_err(|_| corrupt())?,
            access_claims,
            Issued::at(self.access_issued),
            Expiration::at(self.access_expiration),
        )
        .map_err(|_| corrupt())?;

        let refresh_claims = Claims::new(self.refresh_claims.0).map_err(|_| corrupt())?;
        let refresh = Jwt::new(
            EncodedToken::new(self.refresh_token).map_err(|_| corrupt())?,
            JwtType::Refresh,
            Subject::new(self.refresh_subject).map_err(|_| corrupt())?,
            refresh_claims,
            Issued::at(self.refresh_issued),
            Expiration::at(self.refresh_expiration),
        )
        .map_err(|_| corrupt())?;

        let pair = JwtPair::new(access, refresh);
        let user_id = Subject::new(self.user_id).map_err(|_| corrupt())?;

        Ok(JwtAuthentication::authenticated(SessionId::new(self.id), user_id, pair))
    }
}

#[cfg(test)]
mod tests {
    // Exercising these queries requires a live PostgreSQL instance with the
    // `sessions` table migrated; those are integration tests, marked
    // #[ignore] and run separately. See `service::session_engine` for
    // `MockSessionRepository`-based orchestrator tests.
}
