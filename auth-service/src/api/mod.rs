//! # API Layer
//!
//! HTTP request/response processing over [`shared::service::SessionEngine`].
//!
//! ## Module Organization
//!
//! | Module     | Responsibility                                      |
//! |------------|------------------------------------------------------|
//! | `routes`   | Route definitions with actix-web's `configure()`      |
//! | `handlers` | Request handlers (extractors → engine → response)     |
//! | `dto`      | Data Transfer Objects for request/response            |
//!
//! ## Endpoint Summary
//!
//! | Method | Path                      | Handler         | Engine operation   |
//! |--------|---------------------------|-----------------|--------------------|
//! | POST   | `/api/v1/auth/register`   | `register`      | —                  |
//! | POST   | `/api/v1/auth/login`      | `login`         | Grant              |
//! | POST   | `/api/v1/auth/refresh`    | `refresh_token` | Refresh            |
//! | POST   | `/api/v1/auth/logout`     | `logout`        | Verify + Revoke    |
//! | POST   | `/api/v1/auth/logout-all` | `logout_all`    | Verify + Revoke-all|
//! | GET    | `/api/v1/auth/me`         | `get_profile`   | Verify             |
//! | GET    | `/health`                 | `health_check`  | —                  |
//!
//! ## Related Documentation
//!
//! - Session engine: [`shared::service::SessionEngine`]
//! - Error responses: [`shared::errors::EngineError`]

pub mod dto;
pub mod handlers;
pub mod routes;
