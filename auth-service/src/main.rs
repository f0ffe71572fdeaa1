//! # Auth Service
//!
//! Example HTTP binary over [`shared::service::SessionEngine`]: the thinnest
//! possible demo surface that exercises Grant/Verify/Refresh/Revoke plus a
//! `/register` endpoint so there's something to log in with.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        HTTP Layer (api/)                        │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐ │
//! │  │   routes    │  │  handlers   │  │    DTOs (Request/Res)   │ │
//! │  └──────┬──────┘  └──────┬──────┘  └────────────┬────────────┘ │
//! └─────────┼────────────────┼─────────────────────┼───────────────┘
//!           │                │                      │
//!           ▼                ▼                      ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              shared::service::SessionEngine                    │
//! │     (Grant, Verify, Refresh, Revoke, background purger)         │
//! └─────────┬─────────────────────────────────────────┬─────────────┘
//!           │                                         │
//!           ▼                                         ▼
//! ┌───────────────────────┐               ┌───────────────────────────┐
//! │  UserRepository        │               │  shared session stores     │
//! │  (this binary's only   │               │  (PgSessionRepository +    │
//! │  owned table: `users`) │               │  RedisClient)              │
//! └───────────────────────┘               └───────────────────────────┘
//! ```
//!
//! ## API Endpoints
//!
//! | Method | Endpoint                  | Description                 | Auth |
//! |--------|---------------------------|-----------------------------|------|
//! | POST   | `/api/v1/auth/register`   | Create demo account         | No   |
//! | POST   | `/api/v1/auth/login`      | Grant a session             | No   |
//! | POST   | `/api/v1/auth/refresh`    | Refresh a session           | No*  |
//! | POST   | `/api/v1/auth/logout`     | Revoke the current session  | No*  |
//! | POST   | `/api/v1/auth/logout-all` | Revoke all of a user's sessions | Yes |
//! | GET    | `/api/v1/auth/me`         | Get the verified principal  | Yes  |
//! | GET    | `/health`                 | Service health status       | No   |
//!
//! *Requires a valid refresh token in the request body rather than a bearer header.
//!
//! ## Configuration
//!
//! Environment variables are loaded via [`shared::config::AppConfig`]. Key
//! settings: `SERVICE_NAME`, `JWT_SECRET`, `DATABASE_URL`, `REDIS_URL`, and
//! the `APP_CODEC__*` / `APP_SESSION_ENGINE__*` knobs documented on
//! [`shared::config`].
//!
//! ## Related Documentation
//!
//! - Session protocol: [`shared::service::SessionEngine`]
//! - Token codec: [`shared::auth::codec`]

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use shared::auth::codec::{Decoder, Issuer};
use shared::auth::credentials::Argon2CredentialsVerifier;
use shared::auth::password::PasswordHasher;
use shared::config::AppConfig;
use shared::redis_client::RedisClient;
use shared::repository::PgSessionRepository;
use shared::service::SessionEngine;
use shared::{database, tracing_config};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod domain;
mod repository;

use api::routes;
use repository::UserRepository;

/// Shared application state injected into all request handlers via
/// [`actix_web::web::Data`].
///
/// `SessionEngine` and `PasswordHasher` are already cheap to clone
/// (`Arc`-backed internally); `UserRepository` holds a `PgPool`, which is
/// likewise `Arc`-backed, so the whole struct can be cloned per worker
/// without extra wrapping.
#[derive(Clone)]
pub struct AppState {
    /// The session orchestrator: Grant/Verify/Refresh/Revoke.
    pub engine: SessionEngine,
    /// Backs `/register` and the credentials verifier's `UserDirectory`.
    pub user_repository: UserRepository,
    /// Hashes passwords for `/register`; the credentials verifier has its own.
    pub password_hasher: PasswordHasher,
}

/// Application entry point and server initialization.
///
/// # Initialization Sequence
///
/// 1. Load configuration from environment variables
/// 2. Initialize structured logging/tracing
/// 3. Create the PostgreSQL connection pool and Redis client
/// 4. Wire the session engine's collaborators (codec, credentials verifier,
///    durable repository, fast-access index)
/// 5. Spawn the background purger
/// 6. Configure and start the HTTP server
///
/// # Error Handling
///
/// Uses `expect()` for critical initialization errors that should prevent
/// the service from starting (fail-fast pattern).
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::from_env().expect("Failed to load configuration");

    tracing_config::init_tracing(&config.service_name, config.is_production());

    info!(
        service = %config.service_name,
        host = %config.server.host,
        port = %config.server.port,
        "Starting auth-service"
    );

    let db_pool = database::create_pool(&config.database)
        .await
        .expect("Failed to create database pool");

    let redis_client = RedisClient::new(&config.redis)
        .await
        .expect("Failed to connect to Redis");

    // ─────────────────────────────────────────────────────────────────────
    // Wire the session engine's collaborators.
    // ─────────────────────────────────────────────────────────────────────
    let user_repository = UserRepository::new(db_pool.clone());
    let password_hasher = PasswordHasher::new();

    let credentials_verifier = Arc::new(Argon2CredentialsVerifier::new(user_repository.clone()));
    let issuer = Arc::new(Issuer::new(config.codec.clone()));
    let decoder = Arc::new(Decoder::new(config.codec.clone()));
    let session_repository = Arc::new(PgSessionRepository::new(db_pool.clone()));
    let fast_index = Arc::new(redis_client);

    let durable_deadline = Duration::from_millis(config.session_engine.durable_deadline_ms);
    let fast_index_deadline = Duration::from_millis(config.session_engine.fast_index_deadline_ms);
    let engine = SessionEngine::new(
        credentials_verifier,
        issuer,
        decoder,
        session_repository,
        fast_index,
        durable_deadline,
        fast_index_deadline,
    );

    let purge_interval = Duration::from_secs(config.session_engine.purge_interval_seconds);
    Arc::new(engine.clone()).spawn_purger(purge_interval);

    let app_state = web::Data::new(AppState {
        engine,
        user_repository,
        password_hasher,
    });

    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    info!("Server listening on {}:{}", server_host, server_port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin() // TODO: restrict to configured origins before production use
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind((server_host, server_port))?
    .run()
    .await
}
