//! # Fast-Access Token Index
//!
//! A presence-only, per-entry-TTL keyed store backed by Redis, using the
//! namespaced key convention the session engine needs: `jwt:access:<encoded>`
//! and `jwt:refresh:<encoded>`. Values are always the empty string — the
//! store is consulted only for key presence.
//!
//! ## Why a separate store from the durable repository?
//!
//! The durable store (PostgreSQL) is the record of truth; this index exists
//! purely so that Verify can answer "is this token still live" with a single
//! fast round-trip, without touching Postgres, and so that revocation can
//! take effect immediately on the hot path even though the durable row's
//! deletion is the authoritative action.
//!
//! ## Atomicity
//!
//! `save`/`delete` write or remove both keys of a pair in one pipelined,
//! `MULTI`-style round-trip — partial application (one key written, the
//! other not) would let a still-queryable access token outlive its revoked
//! refresh token, or vice versa.
//!
//! ## Connection management
//!
//! We use a `ConnectionManager`, which reconnects automatically on failure —
//! more resilient than a bare connection for a long-running service.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::info;

use crate::config::RedisConfig;
use crate::domain::jwt::JwtPair;
use crate::domain::value_objects::EncodedToken;
use crate::errors::EngineError;

fn access_key(encoded: &EncodedToken) -> String {
    format!("jwt:access:{}", encoded.as_str())
}

fn refresh_key(encoded: &EncodedToken) -> String {
    format!("jwt:refresh:{}", encoded.as_str())
}

/// Port trait so the session orchestrator can be tested against a mock.
/// `#[automock]` generates `MockFastAccessIndex`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FastAccessIndex: Send + Sync {
    /// Writes both keys of `pair` with TTL = `max(1, expiration − now)`
    /// seconds, atomically.
    async fn save(&self, pair: &JwtPair) -> Result<(), EngineError>;

    /// Removes both keys of `pair`, atomically.
    async fn delete(&self, pair: &JwtPair) -> Result<(), EngineError>;

    async fn access_exists(&self, encoded: &EncodedToken) -> Result<bool, EngineError>;

    async fn refresh_exists(&self, encoded: &EncodedToken) -> Result<bool, EngineError>;
}

/// Redis-backed [`FastAccessIndex`]. Cheap to clone and share across tasks —
/// `ConnectionManager` is internally `Arc`-based.
#[derive(Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
}

impl RedisClient {
    /// Connects to Redis and returns a client wrapping an auto-reconnecting
    /// connection manager.
    pub async fn new(config: &RedisConfig) -> Result<Self, EngineError> {
        info!(url = %config.url, "Connecting to fast-access store");

        let client = redis::Client::open(config.url.as_str()).map_err(EngineError::FastIndexError)?;
        let conn = ConnectionManager::new(client).await.map_err(EngineError::FastIndexError)?;

        info!("Fast-access store connection established");

        Ok(Self { conn })
    }

    /// Health check — verifies the store is responding.
    pub async fn ping(&self) -> Result<(), EngineError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(EngineError::FastIndexError)?;
        Ok(())
    }
}

#[async_trait]
impl FastAccessIndex for RedisClient {
    async fn save(&self, pair: &JwtPair) -> Result<(), EngineError> {
        let now = chrono::Utc::now();
        let access_ttl = pair.access().expiration().ttl_seconds_from(now);
        let refresh_ttl = pair.refresh().expiration().ttl_seconds_from(now);

        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .set_ex(access_key(pair.access().encoded()), "", access_ttl)
            .set_ex(refresh_key(pair.refresh().encoded()), "", refresh_ttl)
            .query_async::<()>(&mut conn)
            .await
            .map_err(EngineError::FastIndexError)?;

        Ok(())
    }

    async fn delete(&self, pair: &JwtPair) -> Result<(), EngineError> {
        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .del(access_key(pair.access().encoded()))
            .del(refresh_key(pair.refresh().encoded()))
            .query_async::<()>(&mut conn)
            .await
            .map_err(EngineError::FastIndexError)?;

        Ok(())
    }

    async fn access_exists(&self, encoded: &EncodedToken) -> Result<bool, EngineError> {
        let mut conn = self.conn.clone();
        conn.exists(access_key(encoded)).await.map_err(EngineError::FastIndexError)
    }

    async fn refresh_exists(&self, encoded: &EncodedToken) -> Result<bool, EngineError> {
        let mut conn = self.conn.clone();
        conn.exists(refresh_key(encoded)).await.map_err(EngineError::FastIndexError)
    }
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient").finish_non_exhaustive()
    }
}
