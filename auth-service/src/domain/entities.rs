//! # User Account Entity
//!
//! The one entity this binary owns directly: the row the credentials
//! verifier authenticates against before handing off to
//! [`shared::service::SessionEngine`]. Everything session-shaped (tokens,
//! claims, expirations) lives in `shared::domain` instead — this binary's
//! own domain is deliberately thin.
//!
//! ## Entity Overview
//!
//! | Entity        | Table   | Purpose                              |
//! |----------------|---------|---------------------------------------|
//! | [`UserAccount`] | `users` | Username + password hash + role       |
//!
//! ## Security Considerations
//!
//! - **Never expose `password_hash`** outside this crate's repository layer.
//! - Passwords are hashed with [`shared::auth::password::PasswordHasher`]
//!   before insertion; this entity never sees plaintext.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A row in the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserAccount {
    pub user_id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}
