//! # Domain Layer
//!
//! This binary's own domain, deliberately thin: the one entity it owns
//! directly is the `users` row the credentials verifier authenticates
//! against. Everything session-shaped — tokens, claims, expirations, the
//! session aggregate — lives in `shared::domain` instead.
//!
//! | Module     | Purpose                                |
//! |------------|-----------------------------------------|
//! | `entities` | The `UserAccount` row                   |

pub mod entities;

pub use entities::*;
