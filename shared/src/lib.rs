//! # Session Engine - Shared Library
//!
//! The JWT authentication and session-management engine: value objects, the
//! cryptographic codec, the durable and fast-access stores, and the session
//! orchestrator that sequences them into Grant/Verify/Refresh/Revoke.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         SessionEngine                           │
//! │        (Grant, Verify, Refresh, Revoke, background purger)      │
//! └──────┬──────────────┬──────────────┬──────────────┬─────────────┘
//!        │              │              │              │
//!        ▼              ▼              ▼              ▼
//! ┌────────────┐ ┌─────────────┐ ┌───────────┐ ┌──────────────────┐
//! │ Credentials│ │ Issuer /    │ │  Durable  │ │   Fast-access     │
//! │ Verifier   │ │ Decoder     │ │ Repository│ │   Token Index     │
//! │(Argon2id)  │ │(jsonwebtoken│ │(PostgreSQL│ │     (Redis)       │
//! │            │ │   HS256)    │ │  sessions)│ │                   │
//! └────────────┘ └─────────────┘ └───────────┘ └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose | Key Types |
//! |--------|---------|-----------|
//! | [`domain`] | Value objects, JWT entity, session aggregate | [`domain::Jwt`], [`domain::JwtAuthentication`] |
//! | [`auth`] | Token codec, credentials verification, password hashing | [`auth::Issuer`], [`auth::Decoder`], [`auth::CredentialsVerifier`] |
//! | [`repository`] | Durable session store | [`repository::SessionRepository`] |
//! | [`redis_client`] | Fast-access token index | [`redis_client::FastAccessIndex`] |
//! | [`service`] | The session orchestrator | [`service::SessionEngine`] |
//! | [`config`] | Environment-based configuration | [`AppConfig`] |
//! | [`errors`] | Standardized error handling | [`EngineError`], [`EngineResult`] |
//! | [`database`] | PostgreSQL connection pool | [`database::create_pool`] |
//! | [`tracing_config`] | Structured logging setup | [`tracing_config::init_tracing`] |
//! | [`validation`] | Request DTO validation helpers | Custom validators |
//!
//! ## Design Decisions
//!
//! 1. **Dual-store consistency**: the durable store is the record of truth;
//!    the fast-access index exists only to make Verify fast and revocation
//!    feel immediate. See [`service::SessionEngine`] for the exact ordering
//!    each operation uses and why.
//! 2. **Framework agnostic where possible**: [`errors::EngineError`] adapts
//!    to both Actix-web and Axum.
//! 3. **Ports for testability**: the repository, fast-access index, and
//!    credentials verifier are all traits so the orchestrator can be
//!    exercised against `mockall` mocks without any live store.

pub mod auth;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod redis_client;
pub mod repository;
pub mod service;
pub mod tracing_config;
pub mod validation;

// Re-exports for convenience - import commonly used types directly from `shared`
pub use config::AppConfig;
pub use errors::{EngineError, EngineResult};
pub use service::SessionEngine;
