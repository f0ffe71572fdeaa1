//! # Credentials Verifier
//!
//! The collaborator Grant calls exactly once, before minting a token pair:
//! turns a username/password pair into a [`Principal`], or fails with a
//! single, deliberately generic [`EngineError::BadCredentials`] — the same
//! outcome whether the username doesn't exist or the password is wrong,
//! preventing user enumeration.
//!
//! Password hashing itself goes through Argon2id via
//! [`super::password::PasswordHasher`]. The [`UserDirectory`] seam is a
//! minimal read port over wherever usernames/password hashes live, so this
//! module doesn't need to know about `users` table columns — user CRUD is
//! not this engine's concern.

use async_trait::async_trait;

use crate::auth::password::PasswordHasher;
use crate::domain::value_objects::{Role, Subject};
use crate::errors::EngineError;

/// A directory entry: just enough to verify a password and mint a token.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: Subject,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// The authenticated principal returned on success.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub user_id: Subject,
    pub username: String,
    pub role: Role,
}

/// Read-only seam over wherever user records live. Deliberately minimal —
/// user registration, profile fields, and the rest of user CRUD are out of
/// scope for this engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, EngineError>;
}

/// Verifies a username/password pair.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialsVerifier: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> Result<Principal, EngineError>;
}

/// Argon2id-backed [`CredentialsVerifier`] over a [`UserDirectory`].
pub struct Argon2CredentialsVerifier<D: UserDirectory> {
    directory: D,
    hasher: PasswordHasher,
}

impl<D: UserDirectory> Argon2CredentialsVerifier<D> {
    pub fn new(directory: D) -> Self {
        Self { directory, hasher: PasswordHasher::new() }
    }
}

#[async_trait]
impl<D: UserDirectory> CredentialsVerifier for Argon2CredentialsVerifier<D> {
    async fn verify(&self, username: &str, password: &str) -> Result<Principal, EngineError> {
        let record = self
            .directory
            .find_by_username(username)
            .await?
            .ok_or(EngineError::BadCredentials)?;

        let matches = self
            .hasher
            .verify(password, &record.password_hash)
            .map_err(|_| EngineError::BadCredentials)?;

        if !matches {
            return Err(EngineError::BadCredentials);
        }

        Ok(Principal {
            user_id: record.user_id,
            username: record.username,
            role: record.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticDirectory(Option<UserRecord>);

    #[async_trait]
    impl UserDirectory for StaticDirectory {
        async fn find_by_username(&self, _username: &str) -> Result<Option<UserRecord>, EngineError> {
            Ok(self.0.clone())
        }
    }

    fn record(password_hash: String) -> UserRecord {
        UserRecord {
            user_id: Subject::new("user-1").unwrap(),
            username: "alice".to_string(),
            password_hash,
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn verifies_correct_credentials() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("Correct-Horse7!").unwrap();
        let verifier = Argon2CredentialsVerifier::new(StaticDirectory(Some(record(hash))));

        let principal = verifier.verify("alice", "Correct-Horse7!").await.unwrap();
        assert_eq!(principal.username, "alice");
        assert_eq!(principal.role, Role::User);
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("Correct-Horse7!").unwrap();
        let verifier = Argon2CredentialsVerifier::new(StaticDirectory(Some(record(hash))));

        let err = verifier.verify("alice", "wrong").await.unwrap_err();
        assert!(matches!(err, EngineError::BadCredentials));
    }

    #[tokio::test]
    async fn rejects_unknown_username_with_the_same_error() {
        let verifier = Argon2CredentialsVerifier::new(StaticDirectory(None));

        let err = verifier.verify("ghost", "whatever").await.unwrap_err();
        assert!(matches!(err, EngineError::BadCredentials));
    }
}
