//! # Session Engine Domain Model
//!
//! The value objects, typed JWT entity, and session aggregate that make up
//! the engine's core data model. Nothing in this module performs I/O.

pub mod jwt;
pub mod session;
pub mod value_objects;

pub use jwt::{Jwt, JwtError, JwtPair, JwtType};
pub use session::{JwtAuthentication, SessionId};
pub use value_objects::{
    ClaimScalar, ClaimValue, Claims, EncodedToken, Expiration, Issued, Role, Subject,
    ValueObjectError,
};
