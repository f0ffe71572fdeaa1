//! # JWT Entity & JwtPair
//!
//! The typed token at the center of the session engine. A [`Jwt`] binds its
//! encoded wire form to the subject, claims, and timestamps that produced
//! it, and enforces at construction that the mandatory `token_use` claim
//! agrees with its [`JwtType`].
//!
//! ## Related
//!
//! - Minting: [`crate::auth::codec::Issuer`]
//! - Parsing/verification: [`crate::auth::codec::Decoder`]

use super::value_objects::{assert_issued_before_expiration, Claims, EncodedToken, Expiration, Issued, Role, Subject, ValueObjectError};

/// The two kinds of token this engine issues, each with a distinct header
/// `typ` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JwtType {
    Access,
    Refresh,
}

impl JwtType {
    /// Header `typ` tag for this token kind.
    pub fn header_tag(&self) -> &'static str {
        match self {
            JwtType::Access => "at+jwt",
            JwtType::Refresh => "rt+jwt",
        }
    }

    /// Payload `token_use` value for this token kind.
    pub fn token_use(&self) -> &'static str {
        match self {
            JwtType::Access => "access",
            JwtType::Refresh => "refresh",
        }
    }

    /// Parses a header `typ` tag. Unknown tags fail.
    pub fn from_header_tag(tag: &str) -> Result<Self, JwtError> {
        match tag {
            "at+jwt" => Ok(JwtType::Access),
            "rt+jwt" => Ok(JwtType::Refresh),
            other => Err(JwtError::UnknownTypeTag(other.to_string())),
        }
    }

    fn from_token_use(value: &str) -> Option<Self> {
        match value {
            "access" => Some(JwtType::Access),
            "refresh" => Some(JwtType::Refresh),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum JwtError {
    #[error(transparent)]
    ValueObject(#[from] ValueObjectError),
    #[error("unrecognised header type tag: {0}")]
    UnknownTypeTag(String),
    #[error("claims missing mandatory token_use claim")]
    MissingTokenUse,
    #[error("token_use claim `{found}` does not match token type `{expected}`")]
    TokenUseMismatch { expected: &'static str, found: String },
}

/// A typed token: {encoded, type, subject, claims, issued, expiration}.
///
/// Construction invariants:
/// - claims contain a mandatory `token_use` claim drawn from `{access, refresh}`;
/// - that claim's value matches `type`;
/// - `issued < expiration`.
#[derive(Debug, Clone, PartialEq)]
pub struct Jwt {
    encoded: EncodedToken,
    token_type: JwtType,
    subject: Subject,
    claims: Claims,
    issued: Issued,
    expiration: Expiration,
}

impl Jwt {
    pub fn new(
        encoded: EncodedToken,
        token_type: JwtType,
        subject: Subject,
        claims: Claims,
        issued: Issued,
        expiration: Expiration,
    ) -> Result<Self, JwtError> {
        let token_use = claims
            .claim::<String>("token_use")
            .ok_or(JwtError::MissingTokenUse)?;

        let parsed_use = JwtType::from_token_use(&token_use);
        if parsed_use != Some(token_type) {
            return Err(JwtError::TokenUseMismatch {
                expected: token_type.token_use(),
                found: token_use,
            });
        }

        assert_issued_before_expiration(issued, expiration)?;

        Ok(Self {
            encoded,
            token_type,
            subject,
            claims,
            issued,
            expiration,
        })
    }

    pub fn encoded(&self) -> &EncodedToken {
        &self.encoded
    }

    pub fn token_type(&self) -> JwtType {
        self.token_type
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn issued(&self) -> Issued {
        self.issued
    }

    pub fn expiration(&self) -> Expiration {
        self.expiration
    }

    pub fn is_access(&self) -> bool {
        matches!(self.token_type, JwtType::Access)
    }

    pub fn is_refresh(&self) -> bool {
        matches!(self.token_type, JwtType::Refresh)
    }

    /// The `role` claim, parsed, if present and recognised. Absent or
    /// unrecognised role claims yield `None` rather than a hard failure.
    pub fn role_claim(&self) -> Option<Role> {
        self.claims
            .claim::<String>("role")
            .and_then(|r| Role::parse(&r).ok())
    }
}

/// An aggregate of exactly one access [`Jwt`] and one refresh [`Jwt`]. No
/// cross-pair invariant is enforced beyond each component being
/// independently valid.
#[derive(Debug, Clone, PartialEq)]
pub struct JwtPair {
    access: Jwt,
    refresh: Jwt,
}

impl JwtPair {
    pub fn new(access: Jwt, refresh: Jwt) -> Self {
        debug_assert!(access.is_access());
        debug_assert!(refresh.is_refresh());
        Self { access, refresh }
    }

    pub fn access(&self) -> &Jwt {
        &self.access
    }

    pub fn refresh(&self) -> &Jwt {
        &self.refresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn claims_with_use(token_use: &str) -> Claims {
        let mut map = BTreeMap::new();
        map.insert("token_use".to_string(), token_use.into());
        map.insert("role".to_string(), "user".into());
        Claims::new(map).unwrap()
    }

    fn valid_jwt(token_type: JwtType, token_use: &str) -> Result<Jwt, JwtError> {
        let issued = Issued::now();
        let expiration = Expiration::from_ttl_ms(issued, 60_000);
        Jwt::new(
            EncodedToken::new("header.payload.sig").unwrap(),
            token_type,
            Subject::new("user-1").unwrap(),
            claims_with_use(token_use),
            issued,
            expiration,
        )
    }

    #[test]
    fn accepts_matching_type_and_token_use() {
        assert!(valid_jwt(JwtType::Access, "access").is_ok());
        assert!(valid_jwt(JwtType::Refresh, "refresh").is_ok());
    }

    #[test]
    fn rejects_mismatched_token_use() {
        let err = valid_jwt(JwtType::Access, "refresh").unwrap_err();
        assert!(matches!(err, JwtError::TokenUseMismatch { .. }));
    }

    #[test]
    fn rejects_missing_token_use_claim() {
        let mut map = BTreeMap::new();
        map.insert("role".to_string(), "user".into());
        let claims = Claims::new(map).unwrap();
        let issued = Issued::now();
        let expiration = Expiration::from_ttl_ms(issued, 60_000);
        let err = Jwt::new(
            EncodedToken::new("header.payload.sig").unwrap(),
            JwtType::Access,
            Subject::new("user-1").unwrap(),
            claims,
            issued,
            expiration,
        )
        .unwrap_err();
        assert!(matches!(err, JwtError::MissingTokenUse));
    }

    #[test]
    fn rejects_issued_not_before_expiration() {
        let issued = Issued::now();
        let expiration = Expiration::at(issued.as_datetime() - chrono::Duration::seconds(1));
        let err = Jwt::new(
            EncodedToken::new("header.payload.sig").unwrap(),
            JwtType::Access,
            Subject::new("user-1").unwrap(),
            claims_with_use("access"),
            issued,
            expiration,
        )
        .unwrap_err();
        assert!(matches!(err, JwtError::ValueObject(_)));
    }

    #[test]
    fn header_tag_round_trips() {
        assert_eq!(JwtType::from_header_tag("at+jwt").unwrap(), JwtType::Access);
        assert_eq!(JwtType::from_header_tag("rt+jwt").unwrap(), JwtType::Refresh);
        assert!(JwtType::from_header_tag("jwt").is_err());
    }

    #[test]
    fn role_claim_present_and_parseable() {
        let jwt = valid_jwt(JwtType::Access, "access").unwrap();
        assert_eq!(jwt.role_claim(), Some(Role::User));
    }

    #[test]
    fn predicates_match_constructed_type() {
        let access = valid_jwt(JwtType::Access, "access").unwrap();
        let refresh = valid_jwt(JwtType::Refresh, "refresh").unwrap();
        assert!(access.is_access() && !access.is_refresh());
        assert!(refresh.is_refresh() && !refresh.is_access());
    }
}
