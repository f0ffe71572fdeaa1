//! # User Repository
//!
//! Data access for the one table this binary owns: `users`. Backs the
//! session engine's [`shared::auth::credentials::UserDirectory`] port and,
//! for this demo binary's `/register` endpoint, inserts new accounts.
//! Everything else user-CRUD-shaped (profiles, email verification, password
//! reset) is out of scope for this engine.
//!
//! ## Error Handling
//!
//! Database errors map to [`EngineError`] the same way the durable session
//! repository does: a unique-constraint violation on `username` becomes
//! `EngineError::Conflict`, anything else becomes `EngineError::PersistenceError`.

use async_trait::async_trait;
use shared::auth::credentials::{UserDirectory, UserRecord};
use shared::domain::{Role, Subject};
use shared::errors::EngineError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::UserAccount;

/// Thread-safe (holds a `PgPool`, which is `Arc`-backed internally) — cheap
/// to clone and share across Actix-web workers and the credentials verifier.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new account with an already-hashed password. Used only by
    /// the example binary's `/register` demo endpoint — the session engine
    /// itself never creates users.
    pub async fn create(&self, username: &str, password_hash: &str, role: Role) -> Result<UserAccount, EngineError> {
        let user: UserAccount = sqlx::query_as(
            r#"
            INSERT INTO users (user_id, username, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_create_error)?;

        Ok(user)
    }

    async fn find_by_username_row(&self, username: &str) -> Result<Option<UserAccount>, EngineError> {
        sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(EngineError::PersistenceError)
    }
}

fn map_create_error(e: sqlx::Error) -> EngineError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.constraint() == Some("users_username_key") {
            return EngineError::Conflict { resource: "username".to_string() };
        }
    }
    EngineError::PersistenceError(e)
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, EngineError> {
        let Some(row) = self.find_by_username_row(username).await? else {
            return Ok(None);
        };

        let role = Role::parse(&row.role)
            .map_err(|_| EngineError::InternalError { message: "stored user row carries an unrecognised role".to_string() })?;
        let user_id = Subject::new(row.user_id.to_string())
            .map_err(|_| EngineError::InternalError { message: "stored user row has an empty user_id".to_string() })?;

        Ok(Some(UserRecord {
            user_id,
            username: row.username,
            password_hash: row.password_hash,
            role,
        }))
    }
}

#[cfg(test)]
mod tests {
    // Exercising these queries requires a live PostgreSQL instance with the
    // `users` table migrated; those are integration tests, marked #[ignore]
    // and run separately. See `shared::auth::credentials` for
    // `StaticDirectory`/mock-based verifier tests.
}
