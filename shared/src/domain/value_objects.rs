//! # Session Engine Value Objects
//!
//! Canonical, validated, immutable domain primitives. Each type enforces its
//! own invariant at construction so that once a value exists, it is valid by
//! definition — no defensive re-checking is needed downstream.
//!
//! ## Types
//!
//! | Type | Invariant |
//! |------|-----------|
//! | [`EncodedToken`] | non-empty |
//! | [`Subject`] | non-empty |
//! | [`Issued`] / [`Expiration`] | millisecond-resolution instants |
//! | [`Claims`] | non-empty, heterogeneous scalar map |
//! | [`Role`] | closed enumeration |

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Construction error for a value object. Kept separate from [`crate::errors::EngineError`]
/// so value objects stay free of any HTTP or store concern.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("encoded token must not be blank")]
    BlankEncodedToken,
    #[error("subject must not be blank")]
    BlankSubject,
    #[error("claims must not be empty")]
    EmptyClaims,
    #[error("issued instant must precede expiration")]
    IssuedNotBeforeExpiration,
    #[error("unrecognised role: {0}")]
    UnknownRole(String),
}

// =============================================================================
// EncodedToken
// =============================================================================

/// A signed JWT in compact serialization form. Immutable, value-equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EncodedToken(String);

impl EncodedToken {
    pub fn new(raw: impl Into<String>) -> Result<Self, ValueObjectError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValueObjectError::BlankEncodedToken);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EncodedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Subject
// =============================================================================

/// The user's stable identifier or login name carried inside a JWT's `sub` claim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Subject(String);

impl Subject {
    pub fn new(raw: impl Into<String>) -> Result<Self, ValueObjectError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValueObjectError::BlankSubject);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Issued / Expiration
// =============================================================================

/// Millisecond-resolution instant at which a token was minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Issued(DateTime<Utc>);

impl Issued {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Millisecond-resolution instant after which a token is no longer valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Expiration(DateTime<Utc>);

impl Expiration {
    /// Builds an expiration `ttl_ms` after `issued`. Does not itself check
    /// `issued < expiration` — that cross-field invariant is enforced where
    /// both are combined (see `Jwt::new`).
    pub fn from_ttl_ms(issued: Issued, ttl_ms: i64) -> Self {
        Self(issued.as_datetime() + chrono::Duration::milliseconds(ttl_ms))
    }

    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn has_passed(&self, now: DateTime<Utc>) -> bool {
        self.0 <= now
    }

    /// Seconds remaining until expiration, clamped to a minimum of one
    /// second — the fast-access TTL clamp.
    pub fn ttl_seconds_from(&self, now: DateTime<Utc>) -> u64 {
        let remaining = (self.0 - now).num_seconds();
        remaining.max(1) as u64
    }
}

pub(crate) fn assert_issued_before_expiration(
    issued: Issued,
    expiration: Expiration,
) -> Result<(), ValueObjectError> {
    if issued.as_datetime() < expiration.as_datetime() {
        Ok(())
    } else {
        Err(ValueObjectError::IssuedNotBeforeExpiration)
    }
}

// =============================================================================
// Claims
// =============================================================================

/// A single claim value. JWT payloads mix strings, integers and booleans;
/// this is the heterogeneous scalar a claims map needs to hold any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    String(String),
    Integer(i64),
    Bool(bool),
}

impl ClaimValue {
    fn as_string(&self) -> Option<&str> {
        match self {
            ClaimValue::String(s) => Some(s),
            _ => None,
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            ClaimValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            ClaimValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<String> for ClaimValue {
    fn from(v: String) -> Self {
        ClaimValue::String(v)
    }
}

impl From<&str> for ClaimValue {
    fn from(v: &str) -> Self {
        ClaimValue::String(v.to_string())
    }
}

impl From<i64> for ClaimValue {
    fn from(v: i64) -> Self {
        ClaimValue::Integer(v)
    }
}

impl From<bool> for ClaimValue {
    fn from(v: bool) -> Self {
        ClaimValue::Bool(v)
    }
}

/// Typed accessor target for [`Claims::claim`].
pub trait ClaimScalar: Sized {
    fn from_claim(value: &ClaimValue) -> Option<Self>;
}

impl ClaimScalar for String {
    fn from_claim(value: &ClaimValue) -> Option<Self> {
        value.as_string().map(str::to_owned)
    }
}

impl ClaimScalar for i64 {
    fn from_claim(value: &ClaimValue) -> Option<Self> {
        value.as_integer()
    }
}

impl ClaimScalar for bool {
    fn from_claim(value: &ClaimValue) -> Option<Self> {
        value.as_bool()
    }
}

/// Immutable, non-empty, ordered-irrelevant mapping from claim name to claim
/// value. Copies defensively from any mutable source; never exposes the
/// internal map mutably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims(BTreeMap<String, ClaimValue>);

impl Claims {
    /// Builds claims from an owned map. Rejects empty input.
    pub fn new(entries: BTreeMap<String, ClaimValue>) -> Result<Self, ValueObjectError> {
        if entries.is_empty() {
            return Err(ValueObjectError::EmptyClaims);
        }
        Ok(Self(entries))
    }

    /// Typed accessor: returns `None` when the name is absent or the stored
    /// value doesn't match the requested scalar type.
    pub fn claim<T: ClaimScalar>(&self, name: &str) -> Option<T> {
        self.0.get(name).and_then(T::from_claim)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// A defensive copy of the underlying entries, for serialization into a
    /// storage blob (e.g. the durable repository's `jsonb` claims column).
    pub fn to_owned_map(&self) -> BTreeMap<String, ClaimValue> {
        self.0.clone()
    }
}

// =============================================================================
// Role
// =============================================================================

/// Closed role enumeration carried in the optional `role` claim and on the
/// user principal presented to Grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ValueObjectError> {
        match raw.to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(ValueObjectError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_token_rejects_blank() {
        assert!(EncodedToken::new("").is_err());
        assert!(EncodedToken::new("   ").is_err());
        assert!(EncodedToken::new("abc.def.ghi").is_ok());
    }

    #[test]
    fn subject_rejects_blank() {
        assert!(Subject::new("").is_err());
        assert!(Subject::new("user-1").is_ok());
    }

    #[test]
    fn claims_reject_empty_map() {
        assert!(Claims::new(BTreeMap::new()).is_err());
    }

    #[test]
    fn claims_typed_accessor_mismatches_return_none() {
        let mut map = BTreeMap::new();
        map.insert("token_use".to_string(), ClaimValue::from("access"));
        map.insert("role".to_string(), ClaimValue::from("user"));
        let claims = Claims::new(map).unwrap();

        assert_eq!(claims.claim::<String>("token_use"), Some("access".to_string()));
        assert_eq!(claims.claim::<i64>("token_use"), None);
        assert_eq!(claims.claim::<String>("missing"), None);
    }

    #[test]
    fn expiration_ttl_clamps_to_one_second() {
        let issued = Issued::now();
        let expiration = Expiration::from_ttl_ms(issued, 500);
        // Even though nominally 0.5s, by the time we compute "now" a tick
        // later the remaining seconds could be 0 or negative; clamp to 1.
        let ttl = expiration.ttl_seconds_from(issued.as_datetime() + chrono::Duration::seconds(5));
        assert_eq!(ttl, 1);
    }

    #[test]
    fn role_round_trips_through_parse_and_as_str() {
        assert_eq!(Role::parse("user").unwrap(), Role::User);
        assert_eq!(Role::parse("ADMIN").unwrap(), Role::Admin);
        assert!(Role::parse("superuser").is_err());
        assert_eq!(Role::User.as_str(), "user");
    }

    #[test]
    fn issued_before_expiration_invariant() {
        let issued = Issued::now();
        let expiration = Expiration::from_ttl_ms(issued, 1_000);
        assert!(assert_issued_before_expiration(issued, expiration).is_ok());

        let backwards = Expiration::at(issued.as_datetime() - chrono::Duration::seconds(1));
        assert!(assert_issued_before_expiration(issued, backwards).is_err());
    }
}
