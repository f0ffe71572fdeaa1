//! # Session Orchestrator
//!
//! `SessionEngine` is the coordination point for the four session
//! operations: Grant, Verify, Refresh, Revoke, plus a background purger. It
//! owns no storage itself — it sequences calls to the
//! [`CredentialsVerifier`], [`Issuer`]/[`Decoder`] codec, the durable
//! [`SessionRepository`], and the [`FastAccessIndex`], in a deliberate
//! order chosen to avoid silently granting access on a partial failure.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::auth::codec::{Decoder, Issuer};
use crate::auth::credentials::CredentialsVerifier;
use crate::domain::jwt::{Jwt, JwtPair};
use crate::domain::session::{JwtAuthentication, SessionId};
use crate::domain::value_objects::EncodedToken;
use crate::errors::{EngineError, InvalidJwtCause};
use crate::redis_client::FastAccessIndex;
use crate::repository::SessionRepository;

/// The four session operations plus the background purger.
///
/// Cheap to clone — every field is already `Arc`-like (`Arc<dyn Trait>` or a
/// pool-backed concrete type), so a single instance can be shared across
/// Actix-web workers.
#[derive(Clone)]
pub struct SessionEngine {
    credentials_verifier: Arc<dyn CredentialsVerifier>,
    issuer: Arc<Issuer>,
    decoder: Arc<Decoder>,
    repository: Arc<dyn SessionRepository>,
    fast_index: Arc<dyn FastAccessIndex>,
    /// Per-call deadline for durable store round-trips.
    durable_deadline: Duration,
    /// Per-call deadline for fast-access store round-trips.
    fast_index_deadline: Duration,
}

impl SessionEngine {
    pub fn new(
        credentials_verifier: Arc<dyn CredentialsVerifier>,
        issuer: Arc<Issuer>,
        decoder: Arc<Decoder>,
        repository: Arc<dyn SessionRepository>,
        fast_index: Arc<dyn FastAccessIndex>,
        durable_deadline: Duration,
        fast_index_deadline: Duration,
    ) -> Self {
        Self {
            credentials_verifier,
            issuer,
            decoder,
            repository,
            fast_index,
            durable_deadline,
            fast_index_deadline,
        }
    }

    /// Wraps a store future with its per-call deadline. A caller
    /// that hits the deadline never learns whether the store eventually
    /// would have succeeded — the orchestrator does not retry; the caller
    /// retries at the protocol level.
    async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T, EngineError>
    where
        F: std::future::Future<Output = Result<T, EngineError>>,
    {
        match tokio::time::timeout(deadline, fut).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::DeadlineExceeded),
        }
    }

    async fn durable_call<T, F>(&self, fut: F) -> Result<T, EngineError>
    where
        F: std::future::Future<Output = Result<T, EngineError>>,
    {
        Self::with_deadline(self.durable_deadline, fut).await
    }

    async fn fast_index_call<T, F>(&self, fut: F) -> Result<T, EngineError>
    where
        F: std::future::Future<Output = Result<T, EngineError>>,
    {
        Self::with_deadline(self.fast_index_deadline, fut).await
    }

    // =========================================================================
    // Grant
    // =========================================================================

    /// Authenticates credentials and mints a new session.
    ///
    /// Order: verify credentials → mint access+refresh → durable save →
    /// fast-index save. The fast-index write is best-effort: its failure is
    /// logged, not propagated, since the durable row is already the record
    /// of truth and a missing index entry only costs the next Verify an
    /// extra durable round-trip, not correctness.
    pub async fn grant(&self, username: &str, password: &str) -> Result<JwtAuthentication, EngineError> {
        let principal = self.credentials_verifier.verify(username, password).await?;

        let access = self.issuer.issue_access(&principal.user_id, Some(principal.role))?;
        let refresh = self.issuer.issue_refresh(&principal.user_id, Some(principal.role))?;
        let pair = JwtPair::new(access, refresh);

        let session = JwtAuthentication::unauthenticated(principal.user_id, pair);
        let saved = self.durable_call(self.repository.save(session)).await?;

        if let Err(e) = self.fast_index_call(self.fast_index.save(saved.pair())).await {
            warn!(error = %e, user_id = %saved.user_id(), "fast-access index write failed after grant");
        }

        info!(user_id = %saved.user_id(), "session granted");
        Ok(saved)
    }

    // =========================================================================
    // Verify
    // =========================================================================

    /// Validates an access token and returns its claims.
    ///
    /// Order: decode → confirm it's an access token → fast-index presence
    /// check → durable fetch. Every distinct failure — malformed token, bad
    /// signature, expired, wrong token kind, absent from the fast index,
    /// absent from the durable store, even a store outage — collapses to
    /// the single [`EngineError::InvalidJwt`] outcome. A caller cannot
    /// distinguish "this token was tampered with" from "our Redis is down"
    /// from the response, by design.
    pub async fn verify(&self, encoded: &EncodedToken) -> Result<Jwt, EngineError> {
        let jwt = self.decoder.decode(encoded)?;

        if !jwt.is_access() {
            return Err(EngineError::InvalidJwt { cause: InvalidJwtCause::UnexpectedType });
        }

        let live = self
            .fast_index_call(self.fast_index.access_exists(encoded))
            .await
            .map_err(|_| EngineError::InvalidJwt { cause: InvalidJwtCause::NotFound })?;

        if !live {
            return Err(EngineError::InvalidJwt { cause: InvalidJwtCause::NotFound });
        }

        self.durable_call(self.repository.find_by_access_token(encoded))
            .await
            .map_err(|_| EngineError::InvalidJwt { cause: InvalidJwtCause::NotFound })?
            .ok_or(EngineError::InvalidJwt { cause: InvalidJwtCause::NotFound })?;

        Ok(jwt)
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Verifies a refresh token and issues a new pair in its place.
    ///
    /// Order: verify the refresh token exactly as Verify does for access
    /// tokens → mint a fresh pair → **durable update first** → fast-index
    /// delete of the old pair → fast-index save of the new pair. The
    /// durable write happens before any fast-index mutation so that a
    /// crash between steps never leaves a refreshed session whose durable
    /// record still points at tokens the fast index has already dropped —
    /// that would under-accept a token that should still work. The
    /// opposite failure mode (fast index briefly serving a stale access
    /// token after a durable rotation) is the accepted trade-off: this
    /// ordering favors over-acceptance over under-acceptance.
    pub async fn refresh(&self, encoded_refresh: &EncodedToken) -> Result<JwtAuthentication, EngineError> {
        let (refresh_jwt, mut session) = self.verify_refresh(encoded_refresh).await?;

        let role = refresh_jwt.role_claim();
        let new_access = self.issuer.issue_access(session.user_id(), role)?;
        let new_refresh = self.issuer.issue_refresh(session.user_id(), role)?;
        let old_pair = session.pair().clone();
        let new_pair = JwtPair::new(new_access, new_refresh);

        session.rotate(new_pair);
        let saved = self
            .durable_call(self.repository.save(session))
            .await
            .map_err(|_| EngineError::RefreshFailed)?;

        if let Err(e) = self.fast_index_call(self.fast_index.delete(&old_pair)).await {
            warn!(error = %e, user_id = %saved.user_id(), "fast-access index delete of the rotated-out pair failed");
        }
        if let Err(e) = self.fast_index_call(self.fast_index.save(saved.pair())).await {
            warn!(error = %e, user_id = %saved.user_id(), "fast-access index write of the rotated-in pair failed");
        }

        info!(user_id = %saved.user_id(), "session refreshed");
        Ok(saved)
    }

    /// Shared first phase of Refresh (the same checks Verify runs, applied
    /// to a refresh token instead of an access token): decode → assert
    /// refresh type → fast-index
    /// presence → durable fetch. Exposed so the HTTP surface can resolve a
    /// bare encoded refresh token (e.g. on logout) down to the session
    /// Revoke needs without duplicating this lookup.
    pub async fn verify_refresh(&self, encoded_refresh: &EncodedToken) -> Result<(Jwt, JwtAuthentication), EngineError> {
        let refresh_jwt = self.decoder.decode(encoded_refresh)?;

        if !refresh_jwt.is_refresh() {
            return Err(EngineError::InvalidJwt { cause: InvalidJwtCause::UnexpectedType });
        }

        let live = self
            .fast_index_call(self.fast_index.refresh_exists(encoded_refresh))
            .await
            .map_err(|_| EngineError::InvalidJwt { cause: InvalidJwtCause::NotFound })?;
        if !live {
            return Err(EngineError::InvalidJwt { cause: InvalidJwtCause::NotFound });
        }

        let session = self
            .durable_call(self.repository.find_by_refresh_token(encoded_refresh))
            .await
            .map_err(|_| EngineError::InvalidJwt { cause: InvalidJwtCause::NotFound })?
            .ok_or(EngineError::InvalidJwt { cause: InvalidJwtCause::NotFound })?;

        Ok((refresh_jwt, session))
    }

    // =========================================================================
    // Revoke
    // =========================================================================

    /// Destroys a session. The durable delete is the sole
    /// mandatory step; the fast-index delete is opportunistic and only
    /// possible because the caller already holds the session (and thus its
    /// pair) from a prior Verify/Refresh/Grant — revocation never requires
    /// an extra durable fetch just to learn the pair.
    pub async fn revoke(&self, session: &JwtAuthentication) -> Result<(), EngineError> {
        let id = session.id().ok_or(EngineError::RevokeFailed)?;

        self.durable_call(self.repository.delete_by_id(id))
            .await
            .map_err(|_| EngineError::RevokeFailed)?;

        if let Err(e) = self.fast_index_call(self.fast_index.delete(session.pair())).await {
            warn!(error = %e, session_id = ?id, "fast-access index delete on revoke failed");
        }

        info!(session_id = ?id, "session revoked");
        Ok(())
    }

    /// Revokes every session for a user ("logout everywhere"). Returns the
    /// number of sessions destroyed. Fast-index entries for those sessions
    /// are left to expire by TTL — fetching every pair just to clean them
    /// up early isn't worth the extra durable round-trip.
    pub async fn revoke_all_for_user(&self, user_id: &crate::domain::value_objects::Subject) -> Result<u64, EngineError> {
        let count = self
            .durable_call(self.repository.delete_all_by_user(user_id))
            .await
            .map_err(|_| EngineError::RevokeFailed)?;
        info!(user_id = %user_id, sessions_revoked = count, "all sessions revoked for user");
        Ok(count)
    }

    // =========================================================================
    // Purger
    // =========================================================================

    /// Spawns the background sweeper: every `purge_interval`,
    /// deletes durable sessions whose refresh token has already expired.
    /// Never touches the fast index — its entries expire on their own TTLs.
    pub fn spawn_purger(self: Arc<Self>, purge_interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(purge_interval);
            loop {
                ticker.tick().await;
                match self.repository.delete_all_refresh_expired_before(chrono::Utc::now()).await {
                    Ok(count) if count > 0 => info!(purged = count, "purged expired sessions"),
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "session purge sweep failed"),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::codec::CodecConfig;
    use crate::auth::credentials::{MockCredentialsVerifier, Principal};
    use crate::domain::value_objects::{Role, Subject};
    use crate::redis_client::MockFastAccessIndex;
    use crate::repository::MockSessionRepository;
    use jsonwebtoken::Algorithm;

    fn codec_config() -> CodecConfig {
        CodecConfig {
            signing_key: "test_secret_key_minimum_32_chars_required".to_string(),
            algorithm: Algorithm::HS256,
            access_ttl_ms: 60_000,
            refresh_ttl_ms: 3_600_000,
            clock_skew_ms: 5_000,
        }
    }

    fn engine(
        credentials_verifier: MockCredentialsVerifier,
        repository: MockSessionRepository,
        fast_index: MockFastAccessIndex,
    ) -> SessionEngine {
        let cfg = codec_config();
        SessionEngine::new(
            Arc::new(credentials_verifier),
            Arc::new(Issuer::new(cfg.clone())),
            Arc::new(Decoder::new(cfg)),
            Arc::new(repository),
            Arc::new(fast_index),
            Duration::from_secs(2),
            Duration::from_millis(500),
        )
    }

    #[tokio::test]
    async fn grant_mints_and_saves_a_session() {
        let mut verifier = MockCredentialsVerifier::new();
        verifier.expect_verify().returning(|_, _| {
            Ok(Principal { user_id: Subject::new("user-1").unwrap(), username: "alice".to_string(), role: Role::User })
        });

        let mut repository = MockSessionRepository::new();
        repository.expect_save().returning(|session| {
            Ok(session.with_assigned_id(SessionId::new(uuid::Uuid::new_v4())))
        });

        let mut fast_index = MockFastAccessIndex::new();
        fast_index.expect_save().returning(|_| Ok(()));

        let engine = engine(verifier, repository, fast_index);
        let session = engine.grant("alice", "password").await.unwrap();

        assert!(session.is_authenticated());
        assert_eq!(session.user_id().as_str(), "user-1");
    }

    #[tokio::test]
    async fn grant_surfaces_bad_credentials() {
        let mut verifier = MockCredentialsVerifier::new();
        verifier.expect_verify().returning(|_, _| Err(EngineError::BadCredentials));

        let engine = engine(verifier, MockSessionRepository::new(), MockFastAccessIndex::new());
        let err = engine.grant("ghost", "wrong").await.unwrap_err();
        assert!(matches!(err, EngineError::BadCredentials));
    }

    #[tokio::test]
    async fn grant_tolerates_fast_index_failure() {
        let mut verifier = MockCredentialsVerifier::new();
        verifier.expect_verify().returning(|_, _| {
            Ok(Principal { user_id: Subject::new("user-1").unwrap(), username: "alice".to_string(), role: Role::User })
        });

        let mut repository = MockSessionRepository::new();
        repository.expect_save().returning(|session| {
            Ok(session.with_assigned_id(SessionId::new(uuid::Uuid::new_v4())))
        });

        let mut fast_index = MockFastAccessIndex::new();
        fast_index.expect_save().returning(|_| Err(EngineError::FastIndexError(redis::RedisError::from(std::io::Error::other("down")))));

        let engine = engine(verifier, repository, fast_index);
        let session = engine.grant("alice", "password").await.unwrap();
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn verify_rejects_token_absent_from_fast_index() {
        let cfg = codec_config();
        let issuer = Issuer::new(cfg.clone());
        let access = issuer.issue_access(&Subject::new("user-1").unwrap(), Some(Role::User)).unwrap();

        let mut fast_index = MockFastAccessIndex::new();
        fast_index.expect_access_exists().returning(|_| Ok(false));

        let engine = engine(MockCredentialsVerifier::new(), MockSessionRepository::new(), fast_index);
        let err = engine.verify(access.encoded()).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidJwt { .. }));
    }

    #[tokio::test]
    async fn verify_rejects_a_refresh_token_presented_as_access() {
        let cfg = codec_config();
        let issuer = Issuer::new(cfg.clone());
        let refresh = issuer.issue_refresh(&Subject::new("user-1").unwrap(), None).unwrap();

        let engine = engine(MockCredentialsVerifier::new(), MockSessionRepository::new(), MockFastAccessIndex::new());
        let err = engine.verify(refresh.encoded()).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidJwt { .. }));
    }

    /// A [`SessionRepository`] whose `save` never resolves before a test's
    /// deadline, to exercise `SessionEngine`'s `tokio::time::timeout` wrapping
    /// without needing mockall to model an async delay.
    struct StallingRepository;

    #[async_trait::async_trait]
    impl SessionRepository for StallingRepository {
        async fn save(&self, _session: JwtAuthentication) -> Result<JwtAuthentication, EngineError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!("deadline should fire first")
        }
        async fn find_by_access_token(&self, _token: &EncodedToken) -> Result<Option<JwtAuthentication>, EngineError> {
            unimplemented!()
        }
        async fn find_by_refresh_token(&self, _token: &EncodedToken) -> Result<Option<JwtAuthentication>, EngineError> {
            unimplemented!()
        }
        async fn find_all_by_user(&self, _user_id: &crate::domain::value_objects::Subject) -> Result<Vec<JwtAuthentication>, EngineError> {
            unimplemented!()
        }
        async fn delete_by_id(&self, _id: SessionId) -> Result<(), EngineError> {
            unimplemented!()
        }
        async fn delete_all_by_user(&self, _user_id: &crate::domain::value_objects::Subject) -> Result<u64, EngineError> {
            unimplemented!()
        }
        async fn delete_all_refresh_expired_before(&self, _instant: chrono::DateTime<chrono::Utc>) -> Result<u64, EngineError> {
            unimplemented!()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn grant_fails_when_durable_save_exceeds_its_deadline() {
        let mut verifier = MockCredentialsVerifier::new();
        verifier.expect_verify().returning(|_, _| {
            Ok(Principal { user_id: Subject::new("user-1").unwrap(), username: "alice".to_string(), role: Role::User })
        });

        let cfg = codec_config();
        let engine = SessionEngine::new(
            Arc::new(verifier),
            Arc::new(Issuer::new(cfg.clone())),
            Arc::new(Decoder::new(cfg)),
            Arc::new(StallingRepository),
            Arc::new(MockFastAccessIndex::new()),
            Duration::from_millis(10),
            Duration::from_millis(500),
        );

        let err = engine.grant("alice", "password").await.unwrap_err();
        assert!(matches!(err, EngineError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn revoke_requires_an_authenticated_session() {
        let cfg = codec_config();
        let issuer = Issuer::new(cfg.clone());
        let access = issuer.issue_access(&Subject::new("user-1").unwrap(), None).unwrap();
        let refresh = issuer.issue_refresh(&Subject::new("user-1").unwrap(), None).unwrap();
        let pair = JwtPair::new(access, refresh);
        let session = JwtAuthentication::unauthenticated(Subject::new("user-1").unwrap(), pair);

        let engine = engine(MockCredentialsVerifier::new(), MockSessionRepository::new(), MockFastAccessIndex::new());
        let err = engine.revoke(&session).await.unwrap_err();
        assert!(matches!(err, EngineError::RevokeFailed));
    }

    // =========================================================================
    // End-to-end lifecycle scenarios, against stateful in-memory fakes rather
    // than per-call mock expectations — these exercise the same session
    // across Grant/Verify/Refresh/Revoke the way a real caller would.
    // =========================================================================

    mod lifecycle {
        use super::*;
        use std::collections::HashMap;
        use std::sync::Mutex;

        #[derive(Default)]
        struct InMemoryRepository {
            by_id: Mutex<HashMap<uuid::Uuid, JwtAuthentication>>,
        }

        #[async_trait::async_trait]
        impl SessionRepository for InMemoryRepository {
            async fn save(&self, session: JwtAuthentication) -> Result<JwtAuthentication, EngineError> {
                let mut rows = self.by_id.lock().unwrap();
                let saved = match session.id() {
                    Some(id) => {
                        rows.insert(id.as_uuid(), session.clone());
                        session
                    }
                    None => {
                        let id = SessionId::new(uuid::Uuid::new_v4());
                        let saved = session.with_assigned_id(id);
                        rows.insert(id.as_uuid(), saved.clone());
                        saved
                    }
                };
                Ok(saved)
            }

            async fn find_by_access_token(&self, token: &EncodedToken) -> Result<Option<JwtAuthentication>, EngineError> {
                let rows = self.by_id.lock().unwrap();
                Ok(rows.values().find(|s| s.pair().access().encoded() == token).cloned())
            }

            async fn find_by_refresh_token(&self, token: &EncodedToken) -> Result<Option<JwtAuthentication>, EngineError> {
                let rows = self.by_id.lock().unwrap();
                Ok(rows.values().find(|s| s.pair().refresh().encoded() == token).cloned())
            }

            async fn find_all_by_user(&self, user_id: &Subject) -> Result<Vec<JwtAuthentication>, EngineError> {
                let rows = self.by_id.lock().unwrap();
                Ok(rows.values().filter(|s| s.user_id() == user_id).cloned().collect())
            }

            async fn delete_by_id(&self, id: SessionId) -> Result<(), EngineError> {
                let mut rows = self.by_id.lock().unwrap();
                rows.remove(&id.as_uuid());
                Ok(())
            }

            async fn delete_all_by_user(&self, user_id: &Subject) -> Result<u64, EngineError> {
                let mut rows = self.by_id.lock().unwrap();
                let before = rows.len();
                rows.retain(|_, s| s.user_id() != user_id);
                Ok((before - rows.len()) as u64)
            }

            async fn delete_all_refresh_expired_before(&self, instant: chrono::DateTime<chrono::Utc>) -> Result<u64, EngineError> {
                let mut rows = self.by_id.lock().unwrap();
                let before = rows.len();
                rows.retain(|_, s| !s.pair().refresh().expiration().has_passed(instant));
                Ok((before - rows.len()) as u64)
            }
        }

        #[derive(Default)]
        struct InMemoryFastIndex {
            keys: Mutex<std::collections::HashSet<String>>,
        }

        #[async_trait::async_trait]
        impl FastAccessIndex for InMemoryFastIndex {
            async fn save(&self, pair: &JwtPair) -> Result<(), EngineError> {
                let mut keys = self.keys.lock().unwrap();
                keys.insert(pair.access().encoded().as_str().to_string());
                keys.insert(pair.refresh().encoded().as_str().to_string());
                Ok(())
            }

            async fn delete(&self, pair: &JwtPair) -> Result<(), EngineError> {
                let mut keys = self.keys.lock().unwrap();
                keys.remove(pair.access().encoded().as_str());
                keys.remove(pair.refresh().encoded().as_str());
                Ok(())
            }

            async fn access_exists(&self, encoded: &EncodedToken) -> Result<bool, EngineError> {
                Ok(self.keys.lock().unwrap().contains(encoded.as_str()))
            }

            async fn refresh_exists(&self, encoded: &EncodedToken) -> Result<bool, EngineError> {
                Ok(self.keys.lock().unwrap().contains(encoded.as_str()))
            }
        }

        fn lifecycle_engine(cfg: CodecConfig) -> SessionEngine {
            let mut verifier = MockCredentialsVerifier::new();
            verifier.expect_verify().returning(|_, _| {
                Ok(Principal { user_id: Subject::new("U1").unwrap(), username: "alice".to_string(), role: Role::User })
            });
            SessionEngine::new(
                Arc::new(verifier),
                Arc::new(Issuer::new(cfg.clone())),
                Arc::new(Decoder::new(cfg.clone())),
                Arc::new(InMemoryRepository::default()),
                Arc::new(InMemoryFastIndex::default()),
                Duration::from_secs(2),
                Duration::from_millis(500),
            )
        }

        /// S1: Grant then Verify_access returns a session matching the grant.
        #[tokio::test]
        async fn s1_grant_then_verify_access_round_trips() {
            let engine = lifecycle_engine(codec_config());
            let session = engine.grant("alice", "password").await.unwrap();

            let jwt = engine.verify(session.pair().access().encoded()).await.unwrap();
            assert_eq!(jwt.subject().as_str(), "U1");
            assert_eq!(jwt.role_claim(), Some(Role::User));

            let (_, refreshed_session) = engine.verify_refresh(session.pair().refresh().encoded()).await.unwrap();
            assert_eq!(refreshed_session, session);
        }

        /// S2: a tampered access token is rejected.
        #[tokio::test]
        async fn s2_tampered_signature_is_rejected() {
            let engine = lifecycle_engine(codec_config());
            let session = engine.grant("alice", "password").await.unwrap();

            let mut tampered = session.pair().access().encoded().as_str().to_string();
            tampered.push('x');
            let tampered = EncodedToken::new(tampered).unwrap();

            let err = engine.verify(&tampered).await.unwrap_err();
            assert!(matches!(err, EngineError::InvalidJwt { .. }));
        }

        /// S3: an expired access token is rejected while the refresh token,
        /// issued with a longer TTL, still verifies.
        #[tokio::test]
        async fn s3_expired_access_token_is_rejected_but_refresh_survives() {
            let mut cfg = codec_config();
            cfg.access_ttl_ms = 1;
            cfg.clock_skew_ms = 0;
            let engine = lifecycle_engine(cfg);
            let session = engine.grant("alice", "password").await.unwrap();

            tokio::time::sleep(Duration::from_millis(1050)).await;

            let err = engine.verify(session.pair().access().encoded()).await.unwrap_err();
            assert!(matches!(
                err,
                EngineError::InvalidJwt { cause: InvalidJwtCause::Expired }
            ));
            assert!(engine.verify_refresh(session.pair().refresh().encoded()).await.is_ok());
        }

        /// S4: after Refresh, the old pair no longer verifies and the new
        /// pair does.
        #[tokio::test]
        async fn s4_refresh_invalidates_the_old_pair() {
            let engine = lifecycle_engine(codec_config());
            let session = engine.grant("alice", "password").await.unwrap();
            let old_access = session.pair().access().encoded().clone();

            let rotated = engine.refresh(session.pair().refresh().encoded()).await.unwrap();

            let err = engine.verify(&old_access).await.unwrap_err();
            assert!(matches!(err, EngineError::InvalidJwt { .. }));

            let jwt = engine.verify(rotated.pair().access().encoded()).await.unwrap();
            assert_eq!(jwt.subject().as_str(), "U1");
        }

        /// S5: after Revoke, every token of that session is rejected.
        #[tokio::test]
        async fn s5_revoke_invalidates_the_session() {
            let engine = lifecycle_engine(codec_config());
            let session = engine.grant("alice", "password").await.unwrap();

            engine.revoke(&session).await.unwrap();

            let err = engine.verify(session.pair().access().encoded()).await.unwrap_err();
            assert!(matches!(err, EngineError::InvalidJwt { .. }));
        }

        /// S6: `delete_all_by_user` invalidates every session for that user
        /// and empties `find_all_by_user`.
        #[tokio::test]
        async fn s6_delete_all_by_user_invalidates_every_session() {
            let engine = lifecycle_engine(codec_config());
            let session_a = engine.grant("alice", "password").await.unwrap();
            let session_b = engine.grant("alice", "password").await.unwrap();

            let count = engine.revoke_all_for_user(session_a.user_id()).await.unwrap();
            assert_eq!(count, 2);

            assert!(engine.verify(session_a.pair().access().encoded()).await.is_err());
            assert!(engine.verify(session_b.pair().access().encoded()).await.is_err());
        }
    }
}
