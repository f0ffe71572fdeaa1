//! # Session Aggregate (JwtAuthentication)
//!
//! The user-scoped session identity plus its current token pair. Has two
//! lifecycle shapes:
//!
//! - **unauthenticated** — `id` absent, the shape used before the durable
//!   store assigns an id;
//! - **authenticated** — `id` present, the shape after persistence.
//!
//! Equality is identity-based: two authenticated sessions with the same id
//! are equal; unauthenticated sessions are equal only to themselves. Rust
//! has no free-standing reference equality outside `Rc`/`Arc::ptr_eq`, so an
//! unauthenticated instance carries a synthetic per-construction tag used
//! solely to give it that self-equal-only semantics — this is a deliberate
//! adaptation recorded in DESIGN.md, not an oversight.

use uuid::Uuid;

use super::jwt::JwtPair;
use super::value_objects::Subject;

/// Opaque session identifier assigned by the durable store on first save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

/// The user-scoped session. Owns its pair exclusively.
#[derive(Debug, Clone)]
pub struct JwtAuthentication {
    id: Option<SessionId>,
    user_id: Subject,
    pair: JwtPair,
    /// Self-equal-only discriminator for the unauthenticated shape; ignored
    /// once `id` is `Some`.
    instance_tag: Uuid,
}

impl JwtAuthentication {
    /// The shape used before the durable store assigns an id.
    pub fn unauthenticated(user_id: Subject, pair: JwtPair) -> Self {
        Self {
            id: None,
            user_id,
            pair,
            instance_tag: Uuid::new_v4(),
        }
    }

    /// The shape after persistence. Used by the repository when
    /// reconstituting a row.
    pub fn authenticated(id: SessionId, user_id: Subject, pair: JwtPair) -> Self {
        Self {
            id: Some(id),
            user_id,
            pair,
            instance_tag: Uuid::new_v4(),
        }
    }

    pub fn id(&self) -> Option<SessionId> {
        self.id
    }

    pub fn user_id(&self) -> &Subject {
        &self.user_id
    }

    pub fn pair(&self) -> &JwtPair {
        &self.pair
    }

    pub fn is_authenticated(&self) -> bool {
        self.id.is_some()
    }

    /// Assigns an id, transitioning the unauthenticated shape to
    /// authenticated. Called by the durable repository after a successful
    /// insert. The instance tag is preserved so clones taken before and
    /// after assignment still compare equal to each other.
    pub fn with_assigned_id(mut self, id: SessionId) -> Self {
        self.id = Some(id);
        self
    }

    /// Replaces the pair in place. The id, if any, is preserved. Called only
    /// by Refresh — Verify never mutates the aggregate.
    pub fn rotate(&mut self, new_pair: JwtPair) {
        self.pair = new_pair;
    }
}

impl PartialEq for JwtAuthentication {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.instance_tag == other.instance_tag,
        }
    }
}

impl Eq for JwtAuthentication {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::jwt::{Jwt, JwtType};
    use crate::domain::value_objects::{Claims, EncodedToken, Expiration, Issued};
    use std::collections::BTreeMap;

    fn pair_with_nonce(nonce: &str) -> JwtPair {
        let issued = Issued::now();
        let expiration = Expiration::from_ttl_ms(issued, 60_000);
        let mut access_claims = BTreeMap::new();
        access_claims.insert("token_use".to_string(), "access".into());
        let mut refresh_claims = BTreeMap::new();
        refresh_claims.insert("token_use".to_string(), "refresh".into());

        let access = Jwt::new(
            EncodedToken::new(format!("a.{nonce}.c")).unwrap(),
            JwtType::Access,
            Subject::new("u1").unwrap(),
            Claims::new(access_claims).unwrap(),
            issued,
            expiration,
        )
        .unwrap();
        let refresh = Jwt::new(
            EncodedToken::new(format!("d.{nonce}.f")).unwrap(),
            JwtType::Refresh,
            Subject::new("u1").unwrap(),
            Claims::new(refresh_claims).unwrap(),
            issued,
            expiration,
        )
        .unwrap();
        JwtPair::new(access, refresh)
    }

    fn pair() -> JwtPair {
        pair_with_nonce("b")
    }

    #[test]
    fn unauthenticated_sessions_are_equal_only_to_themselves() {
        let s1 = JwtAuthentication::unauthenticated(Subject::new("u1").unwrap(), pair());
        let s2 = JwtAuthentication::unauthenticated(Subject::new("u1").unwrap(), pair());
        assert_ne!(s1, s2);
        assert_eq!(s1, s1.clone());
    }

    #[test]
    fn authenticated_sessions_equal_by_id() {
        let id = SessionId::new(Uuid::new_v4());
        let s1 = JwtAuthentication::authenticated(id, Subject::new("u1").unwrap(), pair());
        let s2 = JwtAuthentication::authenticated(id, Subject::new("u1").unwrap(), pair());
        assert_eq!(s1, s2);
    }

    #[test]
    fn with_assigned_id_preserves_instance_identity() {
        let unauth = JwtAuthentication::unauthenticated(Subject::new("u1").unwrap(), pair());
        let tag_before = unauth.instance_tag;
        let id = SessionId::new(Uuid::new_v4());
        let authed = unauth.with_assigned_id(id);
        assert_eq!(authed.instance_tag, tag_before);
        assert!(authed.is_authenticated());
    }

    #[test]
    fn rotate_replaces_pair_preserving_id() {
        let id = SessionId::new(Uuid::new_v4());
        let mut session = JwtAuthentication::authenticated(id, Subject::new("u1").unwrap(), pair());
        let old_access = session.pair().access().encoded().clone();
        session.rotate(pair_with_nonce("new"));
        assert_eq!(session.id(), Some(id));
        assert_ne!(session.pair().access().encoded(), &old_access);
    }
}
