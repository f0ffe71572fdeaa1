//! # Cryptographic Codec (Issuer / Decoder)
//!
//! Converts between a [`Jwt`] and its wire form, split into two narrower
//! collaborators — an [`Issuer`] that mints tokens and a [`Decoder`] that
//! parses and verifies them — matching the split the session orchestrator
//! consumes.
//!
//! The wire payload carries the mandatory `token_use` claim and an optional
//! `role` claim; the header `typ` tag distinguishes access from refresh
//! tokens at the framing level, ahead of any claim inspection.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::jwt::{Jwt, JwtType};
use crate::domain::value_objects::{Claims, ClaimValue, EncodedToken, Expiration, Issued, Role, Subject};

/// Signing material and timing knobs. Deserializable so it
/// can be embedded directly in [`crate::config::AppConfig`].
#[derive(Debug, Clone, Deserialize)]
pub struct CodecConfig {
    pub signing_key: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: Algorithm,
    #[serde(default = "default_access_ttl_ms")]
    pub access_ttl_ms: i64,
    #[serde(default = "default_refresh_ttl_ms")]
    pub refresh_ttl_ms: i64,
    #[serde(default = "default_clock_skew_ms")]
    pub clock_skew_ms: i64,
}

fn default_algorithm() -> Algorithm {
    Algorithm::HS256
}

fn default_access_ttl_ms() -> i64 {
    900_000 // 15 minutes
}

fn default_refresh_ttl_ms() -> i64 {
    604_800_000 // 7 days
}

fn default_clock_skew_ms() -> i64 {
    5_000
}

/// Distinct decode failure kinds. The orchestrator collapses all of these
/// into a single `InvalidJwt` at the caller boundary; they are kept
/// distinct here so that collapse is a deliberate choice at the
/// orchestration layer rather than lost information.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CodecError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("unrecognised header type tag")]
    UnknownType,
    #[error("a claim did not match the shape this codec requires")]
    ClaimMismatch,
    #[error("failed to sign token: {0}")]
    SignFailed(String),
}

/// Wire-format payload. Deliberately separate from the domain [`Claims`]
/// map — this is what `jsonwebtoken` serializes/deserializes; the codec
/// translates to and from the domain representation at its boundary.
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    iat: i64,
    exp: i64,
    token_use: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

/// Mints signed access/refresh tokens.
pub struct Issuer {
    encoding_key: EncodingKey,
    config: CodecConfig,
}

impl Issuer {
    pub fn new(config: CodecConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.signing_key.as_bytes());
        Self { encoding_key, config }
    }

    pub fn issue_access(&self, subject: &Subject, role: Option<Role>) -> Result<Jwt, CodecError> {
        self.issue(subject, role, JwtType::Access, self.config.access_ttl_ms)
    }

    pub fn issue_refresh(&self, subject: &Subject, role: Option<Role>) -> Result<Jwt, CodecError> {
        self.issue(subject, role, JwtType::Refresh, self.config.refresh_ttl_ms)
    }

    fn issue(
        &self,
        subject: &Subject,
        role: Option<Role>,
        token_type: JwtType,
        ttl_ms: i64,
    ) -> Result<Jwt, CodecError> {
        let issued = Issued::now();
        let expiration = Expiration::from_ttl_ms(issued, ttl_ms);

        let wire = WireClaims {
            sub: subject.as_str().to_string(),
            iat: issued.as_datetime().timestamp(),
            exp: expiration.as_datetime().timestamp(),
            token_use: token_type.token_use().to_string(),
            role: role.map(|r| r.as_str().to_string()),
        };

        let mut header = Header::new(self.config.algorithm);
        header.typ = Some(token_type.header_tag().to_string());

        let encoded = encode(&header, &wire, &self.encoding_key)
            .map_err(|e| CodecError::SignFailed(e.to_string()))?;

        let mut claims_map = BTreeMap::new();
        claims_map.insert("token_use".to_string(), ClaimValue::from(wire.token_use.clone()));
        if let Some(role) = &wire.role {
            claims_map.insert("role".to_string(), ClaimValue::from(role.clone()));
        }

        let claims = Claims::new(claims_map).expect("token_use is always present in issued claims");
        let encoded = EncodedToken::new(encoded).expect("jsonwebtoken never returns an empty string");

        Ok(Jwt::new(encoded, token_type, subject.clone(), claims, issued, expiration)
            .expect("an issuer always assembles claims consistent with the declared type"))
    }
}

impl std::fmt::Debug for Issuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Issuer").field("config", &self.config).finish_non_exhaustive()
    }
}

/// Parses and verifies tokens this codec issued.
///
/// Decode order: parse compact form → verify signature → verify `exp` (with
/// configured clock skew leeway) → verify header type tag → reconstruct
/// claims → validate full [`Jwt`] invariants.
pub struct Decoder {
    decoding_key: DecodingKey,
    config: CodecConfig,
}

impl Decoder {
    pub fn new(config: CodecConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.signing_key.as_bytes());
        Self { decoding_key, config }
    }

    pub fn decode(&self, encoded: &EncodedToken) -> Result<Jwt, CodecError> {
        // Parse the compact form just far enough to hand it to `decode`
        // below; the header's `typ` tag isn't inspected until signature and
        // expiry have both passed, per spec order.
        decode_header(encoded.as_str()).map_err(|_| CodecError::Malformed)?;

        let mut validation = Validation::new(self.config.algorithm);
        validation.leeway = (self.config.clock_skew_ms.max(0) / 1000) as u64;
        validation.validate_exp = true;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);
        // Single-issuer deployment: no `iss`/`aud` claim is part of the
        // wire format, so neither is checked here.

        let token_data: TokenData<WireClaims> = decode(encoded.as_str(), &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => CodecError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => CodecError::BadSignature,
                _ => CodecError::Malformed,
            })?;

        // Signature and expiry are now verified; only now does an
        // unrecognised header type tag surface as its own cause.
        let header = decode_header(encoded.as_str()).map_err(|_| CodecError::Malformed)?;
        let type_tag = header.typ.ok_or(CodecError::UnknownType)?;
        let token_type = JwtType::from_header_tag(&type_tag).map_err(|_| CodecError::UnknownType)?;

        let wire = token_data.claims;

        let mut claims_map = BTreeMap::new();
        claims_map.insert("token_use".to_string(), ClaimValue::from(wire.token_use.clone()));
        if let Some(role) = &wire.role {
            claims_map.insert("role".to_string(), ClaimValue::from(role.clone()));
        }
        let claims = Claims::new(claims_map).map_err(|_| CodecError::Malformed)?;

        let subject = Subject::new(wire.sub).map_err(|_| CodecError::Malformed)?;
        let issued = Issued::at(timestamp_to_datetime(wire.iat).ok_or(CodecError::Malformed)?);
        let expiration = Expiration::at(timestamp_to_datetime(wire.exp).ok_or(CodecError::Malformed)?);

        Jwt::new(encoded.clone(), token_type, subject, claims, issued, expiration)
            .map_err(|_| CodecError::ClaimMismatch)
    }
}

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder").field("config", &self.config).finish_non_exhaustive()
    }
}

fn timestamp_to_datetime(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
}
