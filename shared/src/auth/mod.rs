//! # Authentication Module
//!
//! The cryptographic and credential-verification collaborators the session
//! engine depends on.
//!
//! ## Module Structure
//!
//! ```text
//! auth/
//! ├── codec.rs       - Issuer/Decoder: mints and parses signed JWTs
//! ├── credentials.rs - CredentialsVerifier: username/password -> Principal
//! └── password.rs    - Argon2id password hashing
//! ```
//!
//! ## Overview
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`codec::Issuer`] | Mints access/refresh tokens |
//! | [`codec::Decoder`] | Parses and verifies tokens |
//! | [`credentials::CredentialsVerifier`] | Authenticates a username/password pair |
//! | [`password::PasswordHasher`] | Argon2id password hashing |

pub mod codec;
pub mod credentials;
pub mod password;

pub use codec::{Decoder, Issuer};
pub use credentials::{CredentialsVerifier, Principal, UserDirectory};
pub use password::PasswordHasher;
