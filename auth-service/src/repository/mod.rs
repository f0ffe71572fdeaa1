//! # Repository Layer
//!
//! Data access for this binary's one owned table (`users`). Implements
//! [`shared::auth::credentials::UserDirectory`] so the session engine's
//! Argon2id credentials verifier can authenticate against it; also backs
//! this demo binary's `/register` endpoint.
//!
//! Session storage itself — the durable record of truth and the fast-access
//! index — lives entirely in `shared` ([`shared::repository`],
//! [`shared::redis_client`]); this binary never touches those tables.

pub mod user_repository;

pub use user_repository::UserRepository;
